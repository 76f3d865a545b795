//! Text-generation collaborator and recommendation engine.
//!
//! # Responsibility
//! - Hide the external model behind `TextGenerator`.
//! - Keep prompts, reply parsing and fallbacks in one place.
//! - Enforce per-user title uniqueness for generated tasks.
//!
//! # Invariants
//! - Nothing in this module returns a generation error to callers.
//!
//! # See also
//! - `service::task_service` for persistence of accepted drafts.

pub mod agent;
pub mod dedup;
pub mod fallback;
pub mod generator;
pub mod ollama;
pub mod parse;
pub mod prompt;
pub mod text;

pub use agent::AiAgent;
pub use dedup::{generate_unique_task, UniqueTaskOutcome};
pub use generator::{GenerationError, TextGenerator};
pub use ollama::OllamaClient;
