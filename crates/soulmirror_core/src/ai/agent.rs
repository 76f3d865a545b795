//! Astrology agent: prompts in, usable text out.
//!
//! # Responsibility
//! - Build prompts from sanitized input and call the injected generator.
//! - Turn every generation failure into deterministic fallback text.
//!
//! # Invariants
//! - No public method fails; degraded results are logged at `warn`.
//! - Prompts never contain unsanitized user text.
//! - User text and generated text are never written to logs.

use crate::ai::fallback::{fallback_draft, generic_description, FallbackKind};
use crate::ai::generator::TextGenerator;
use crate::ai::ollama::OllamaClient;
use crate::ai::parse::{parse_task_reply, ParsedReply};
use crate::ai::prompt::{
    daily_advice_prompt, entry_advice_prompt, natal_prompt, tarot_prompt, task_prompt,
    NatalSection, TaskPrompt, ADVICE_THEMES, DESCRIPTION_FOCUSES,
};
use crate::ai::text::{clean_response, clean_task_reply, sanitize_input};
use crate::config::GeneratorConfig;
use crate::model::reading::{ChartLayout, NatalReadings, TarotCard};
use crate::model::sign::ZodiacSign;
use crate::model::task::{TaskDraft, TaskKind};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Excluded titles included in a recommendation prompt.
pub const PROMPT_EXCLUSION_LIMIT: usize = 10;

pub struct AiAgent<G> {
    generator: G,
    num_predict: u32,
    natal_num_predict: u32,
}

impl AiAgent<OllamaClient> {
    /// Agent backed by an Ollama server.
    pub fn ollama(config: &GeneratorConfig) -> Self {
        Self {
            generator: OllamaClient::new(config.clone()),
            num_predict: config.num_predict,
            natal_num_predict: config.natal_num_predict,
        }
    }
}

impl<G: TextGenerator> AiAgent<G> {
    /// Agent with the default token budgets.
    pub fn new(generator: G) -> Self {
        let defaults = GeneratorConfig::default();
        Self::with_budgets(generator, defaults.num_predict, defaults.natal_num_predict)
    }

    pub fn with_budgets(generator: G, num_predict: u32, natal_num_predict: u32) -> Self {
        Self {
            generator,
            num_predict,
            natal_num_predict,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Reflection on a journal entry.
    pub fn entry_advice(
        &self,
        inner_sign: ZodiacSign,
        user_level: u32,
        event_description: &str,
        emotion_level: u8,
    ) -> String {
        let event = sanitize_input(event_description);
        let prompt = entry_advice_prompt(inner_sign, user_level, &event, emotion_level);
        self.complete(&prompt, self.num_predict, FallbackKind::Event)
    }

    /// Advice of the day on a randomly chosen theme.
    pub fn daily_advice<R: Rng + ?Sized>(&self, rng: &mut R, sign: ZodiacSign) -> String {
        let theme = ADVICE_THEMES
            .choose(rng)
            .copied()
            .unwrap_or(ADVICE_THEMES[0]);
        let prompt = daily_advice_prompt(sign, theme);
        self.complete(&prompt, self.num_predict, FallbackKind::Advice)
    }

    pub fn interpret_tarot(&self, question: &str, cards: &[TarotCard]) -> String {
        let question = sanitize_input(question);
        let prompt = tarot_prompt(&question, cards);
        self.complete(&prompt, self.num_predict, FallbackKind::Tarot)
    }

    /// One recommendation for `target_sign`.
    ///
    /// `existing_titles` is ordered oldest first; only the most recent
    /// `PROMPT_EXCLUSION_LIMIT` reach the prompt. Falls back to the static
    /// table when generation or parsing fails.
    pub fn recommend_task<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        target_sign: ZodiacSign,
        existing_titles: &[String],
    ) -> TaskDraft {
        let kind = TaskKind::ALL.choose(rng).copied().unwrap_or(TaskKind::Book);
        let qualities = target_sign
            .quality_variants()
            .choose(rng)
            .copied()
            .unwrap_or(target_sign.quality_variants()[0]);
        let description_focus = DESCRIPTION_FOCUSES
            .choose(rng)
            .copied()
            .unwrap_or(DESCRIPTION_FOCUSES[0]);
        let recent_start = existing_titles.len().saturating_sub(PROMPT_EXCLUSION_LIMIT);
        let exclusions: Vec<String> = existing_titles[recent_start..]
            .iter()
            .map(|title| sanitize_input(title))
            .filter(|title| !title.is_empty())
            .collect();

        let prompt = task_prompt(&TaskPrompt {
            kind,
            target_sign,
            qualities,
            description_focus,
            exclusions: &exclusions,
        });

        let parsed = match self.generator.generate(&prompt, self.num_predict) {
            Ok(reply) => parse_task_reply(&clean_task_reply(&reply), kind),
            Err(err) => {
                warn!(
                    "event=llm_fallback module=ai status=degraded kind={} error_code={} error={}",
                    FallbackKind::Task.code(),
                    err.code(),
                    err
                );
                ParsedReply::Unparsed
            }
        };

        match parsed {
            ParsedReply::Parsed {
                title,
                author,
                description,
            } => TaskDraft {
                kind,
                title,
                author,
                description: description
                    .unwrap_or_else(|| generic_description(target_sign, qualities)),
            },
            ParsedReply::Unparsed => {
                debug!(
                    "event=task_reply_unparsed module=ai status=degraded kind={} sign={}",
                    kind.code(),
                    target_sign.code()
                );
                fallback_draft(kind, target_sign, qualities)
            }
        }
    }

    /// Four interpretation sections for a generated chart.
    pub fn interpret_natal(&self, birth_sign: ZodiacSign, layout: &ChartLayout) -> NatalReadings {
        let mut readings = NatalReadings::default();
        for section in NatalSection::ALL {
            let prompt = natal_prompt(section, birth_sign, layout);
            let text = self.complete(&prompt, self.natal_num_predict, FallbackKind::General);
            match section {
                NatalSection::Personality => readings.personality = text,
                NatalSection::Career => readings.career = text,
                NatalSection::Relationships => readings.relationships = text,
                NatalSection::LifePurpose => readings.life_purpose = text,
            }
        }
        readings
    }

    /// Generates prose, cleaned for display, or the fallback for `kind`.
    pub fn complete(&self, prompt: &str, num_predict: u32, kind: FallbackKind) -> String {
        match self.generator.generate(prompt, num_predict) {
            Ok(reply) => {
                let cleaned = clean_response(&reply);
                if cleaned.is_empty() {
                    warn!(
                        "event=llm_fallback module=ai status=degraded kind={} error_code=blank_after_cleanup",
                        kind.code()
                    );
                    kind.text().to_string()
                } else {
                    cleaned
                }
            }
            Err(err) => {
                warn!(
                    "event=llm_fallback module=ai status=degraded kind={} error_code={} error={}",
                    kind.code(),
                    err.code(),
                    err
                );
                kind.text().to_string()
            }
        }
    }
}
