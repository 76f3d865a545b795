//! Ollama `/api/generate` client.
//!
//! # Invariants
//! - Requests are non-streaming; one HTTP call per generation.
//! - Every call is bounded by the configured timeout.

use crate::ai::generator::{GenerationError, TextGenerator};
use crate::config::GeneratorConfig;
use log::debug;
use std::io::ErrorKind;
use std::time::{Duration, Instant};

/// Blocking client for a local or remote Ollama server.
pub struct OllamaClient {
    config: GeneratorConfig,
    agent: ureq::Agent,
}

impl OllamaClient {
    pub fn new(config: GeneratorConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }

    fn map_transport(&self, transport: ureq::Transport) -> GenerationError {
        let timed_out = std::error::Error::source(&transport)
            .and_then(|source| source.downcast_ref::<std::io::Error>())
            .is_some_and(|io| matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock));
        if timed_out {
            GenerationError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            GenerationError::Transport(transport.to_string())
        }
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str, num_predict: u32) -> Result<String, GenerationError> {
        let started_at = Instant::now();
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": num_predict,
            },
        });

        let response = match self.agent.post(&self.endpoint()).send_json(body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => return Err(GenerationError::Status(status)),
            Err(ureq::Error::Transport(transport)) => return Err(self.map_transport(transport)),
        };

        let json: serde_json::Value = response
            .into_json()
            .map_err(|err| GenerationError::Decode(err.to_string()))?;
        let text = json["response"]
            .as_str()
            .ok_or_else(|| GenerationError::Decode("missing `response` field".to_string()))?
            .trim()
            .to_string();

        debug!(
            "event=llm_generate module=ai status=ok model={} num_predict={} reply_chars={} duration_ms={}",
            self.config.model,
            num_predict,
            text.chars().count(),
            started_at.elapsed().as_millis()
        );

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}
