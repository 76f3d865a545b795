//! Core domain logic for SoulMirror.
//! This crate is the single source of truth for progression invariants.

pub mod ai;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rules;
pub mod service;

pub use ai::{generate_unique_task, AiAgent, GenerationError, OllamaClient, TextGenerator};
pub use config::{ConfigError, CoreConfig, GeneratorConfig, TaskPolicy};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::profile::ZodiacProfile;
pub use model::sign::ZodiacSign;
pub use model::task::{Task, TaskDraft, TaskKind, TaskStatus};
pub use model::user::User;
pub use repo::{RepoError, RepoResult};
pub use rules::lifecycle::CompletionReport;
pub use service::ServiceError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
