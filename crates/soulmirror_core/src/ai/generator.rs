//! Text-generation seam.
//!
//! # Responsibility
//! - Abstract the external model behind one blocking call.
//! - Classify failures so callers can log them before falling back.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a single generation request.
#[derive(Debug)]
pub enum GenerationError {
    /// Connection, DNS or protocol failure.
    Transport(String),
    /// The request did not finish within the configured timeout.
    Timeout { timeout_secs: u64 },
    /// Non-success HTTP status.
    Status(u16),
    /// Response body was not the expected JSON shape.
    Decode(String),
    /// Response decoded but carried no text.
    EmptyResponse,
}

impl GenerationError {
    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::EmptyResponse => "empty_response",
        }
    }
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "generation transport failed: {message}"),
            Self::Timeout { timeout_secs } => {
                write!(f, "generation timed out after {timeout_secs}s")
            }
            Self::Status(status) => write!(f, "generation returned HTTP status {status}"),
            Self::Decode(message) => write!(f, "generation response is malformed: {message}"),
            Self::EmptyResponse => write!(f, "generation response is empty"),
        }
    }
}

impl Error for GenerationError {}

/// Blocking prompt-to-text generator.
pub trait TextGenerator {
    /// Generates a reply for `prompt` using at most `num_predict` tokens.
    fn generate(&self, prompt: &str, num_predict: u32) -> Result<String, GenerationError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str, num_predict: u32) -> Result<String, GenerationError> {
        (**self).generate(prompt, num_predict)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, prompt: &str, num_predict: u32) -> Result<String, GenerationError> {
        (**self).generate(prompt, num_predict)
    }
}
