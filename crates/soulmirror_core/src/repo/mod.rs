//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write paths validate model invariants before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories borrow a `Connection`; a `Transaction` derefs to one, so
//!   the same repository runs inside or outside a transaction.

use crate::db::DbError;
use crate::model::profile::ProfileValidationError;
use crate::model::sign::ZodiacSign;
use crate::model::task::TaskValidationError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod journal_repo;
pub mod profile_repo;
pub mod reading_repo;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    ProfileValidation(ProfileValidationError),
    TaskValidation(TaskValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfileValidation(err) => write!(f, "{err}"),
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProfileValidation(err) => Some(err),
            Self::TaskValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ProfileValidationError> for RepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::ProfileValidation(value)
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_sign(value: &str, column: &str) -> RepoResult<ZodiacSign> {
    ZodiacSign::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid sign `{value}` in {column}")))
}

pub(crate) fn parse_optional_sign(value: Option<String>, column: &str) -> RepoResult<Option<ZodiacSign>> {
    value.map(|value| parse_sign(&value, column)).transpose()
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T, column: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode {column}: {err}")))
}

pub(crate) fn from_json<T: DeserializeOwned>(raw: &str, column: &str) -> RepoResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("cannot decode {column}: {err}")))
}

/// Encodes a sign-keyed map as a JSON object keyed by sign code.
pub(crate) fn encode_sign_map<T: Serialize + Copy>(
    map: &BTreeMap<ZodiacSign, T>,
    column: &str,
) -> RepoResult<String> {
    let by_code: BTreeMap<&str, T> = map.iter().map(|(sign, value)| (sign.code(), *value)).collect();
    to_json(&by_code, column)
}

/// Decodes a JSON object keyed by sign code, rejecting unknown keys.
pub(crate) fn decode_sign_map<T: DeserializeOwned>(
    raw: &str,
    column: &str,
) -> RepoResult<BTreeMap<ZodiacSign, T>> {
    let by_code: BTreeMap<String, T> = from_json(raw, column)?;
    by_code
        .into_iter()
        .map(|(code, value)| Ok((parse_sign(&code, column)?, value)))
        .collect()
}

pub(crate) fn count_to_usize(value: i64, column: &str) -> RepoResult<usize> {
    usize::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` for {column}")))
}
