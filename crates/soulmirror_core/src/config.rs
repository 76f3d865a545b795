//! Typed core configuration.
//!
//! # Responsibility
//! - Provide defaults for every setting.
//! - Merge an optional TOML file and environment overrides, in that order.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - Environment overrides always win over file values.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "SOULMIRROR_DB";
pub const ENV_LOG_LEVEL: &str = "SOULMIRROR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SOULMIRROR_LOG_DIR";
pub const ENV_OLLAMA_URL: &str = "OLLAMA_API_URL";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Text-generation backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Token budget for ordinary prompts.
    pub num_predict: u32,
    /// Token budget for natal interpretations.
    pub natal_num_predict: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            timeout_secs: 90,
            temperature: 0.8,
            num_predict: 512,
            natal_num_predict: 800,
        }
    }
}

/// Task backlog policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskPolicy {
    /// Active tasks kept for the current inner sign.
    pub min_active: usize,
    /// Generation attempts per unique draft.
    pub max_attempts: u32,
    /// Unique drafts a single backlog refill may request.
    pub backlog_retry_budget: u32,
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self {
            min_active: 3,
            max_attempts: 5,
            backlog_retry_budget: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub generator: GeneratorConfig,
    pub tasks: TaskPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("soulmirror.sqlite3"),
            log_level: default_log_level().to_string(),
            log_dir: None,
            generator: GeneratorConfig::default(),
            tasks: TaskPolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Loads `path` when given and present, then applies process env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = get(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_OLLAMA_URL) {
            self.generator.base_url = value;
        }
        if let Some(value) = get(ENV_OLLAMA_MODEL) {
            self.generator.model = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "generator.timeout_secs must be positive".to_string(),
            ));
        }
        if self.tasks.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "tasks.max_attempts must be positive".to_string(),
            ));
        }
        if self.generator.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "generator.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
