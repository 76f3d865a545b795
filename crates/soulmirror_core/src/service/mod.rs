//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls, rules and the AI agent into use-case
//!   level APIs.
//! - Own transaction boundaries for read-modify-write flows.
//!
//! # Invariants
//! - Read-modify-write of user/profile/task rows runs in one `IMMEDIATE`
//!   transaction.
//! - The text generator is never called while a transaction is open.

use crate::model::user::UserId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod advice_service;
pub mod cache_service;
pub mod entry_service;
pub mod natal_service;
pub mod profile_service;
pub mod stats_service;
pub mod tarot_service;
pub mod task_service;

/// Error for the read-mostly services (advice, tarot, natal, stats, cache).
#[derive(Debug)]
pub enum ServiceError {
    UserNotFound(UserId),
    /// User has not completed onboarding.
    ProfileMissing(UserId),
    InvalidInput(&'static str),
    /// Requested record does not exist.
    NotFound(&'static str),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ProfileMissing(id) => write!(f, "zodiac profile missing for user {id}"),
            Self::InvalidInput(details) => write!(f, "invalid input: {details}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
