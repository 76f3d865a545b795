//! Account registration and zodiac onboarding.
//!
//! # Responsibility
//! - Create users and their one-time zodiac profile from quiz weights.
//! - Expose profile reads and per-sign progress summaries.
//!
//! # Invariants
//! - Usernames are trimmed, non-blank and unique.
//! - A profile is created exactly once per user; the quiz cannot be retaken.
//! - `sign_progress` is seeded with an entry for every sign.

use crate::model::profile::ZodiacProfile;
use crate::model::sign::ZodiacSign;
use crate::model::user::{User, UserId};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::rules::leveling::{sign_stats, SignStat};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProfileServiceError {
    BlankUsername,
    UsernameTaken(String),
    UserNotFound(UserId),
    ProfileAlreadyExists(UserId),
    ProfileMissing(UserId),
    /// Quiz weights contain NaN or infinite values.
    InvalidWeights,
    Repo(RepoError),
}

impl Display for ProfileServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "username must not be blank"),
            Self::UsernameTaken(name) => write!(f, "username already taken: `{name}`"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ProfileAlreadyExists(id) => write!(f, "zodiac profile already exists for user {id}"),
            Self::ProfileMissing(id) => write!(f, "zodiac profile missing for user {id}"),
            Self::InvalidWeights => write!(f, "quiz weights must be finite numbers"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProfileServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProfileServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ProfileServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

pub struct ProfileService<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn register_user(&self, username: &str) -> Result<User, ProfileServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileServiceError::BlankUsername);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let users = SqliteUserRepository::new(&tx);
        if users.find_by_username(username)?.is_some() {
            return Err(ProfileServiceError::UsernameTaken(username.to_string()));
        }
        let user = User::new(username);
        users.create_user(&user)?;
        tx.commit()?;

        info!(
            "event=user_register module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, ProfileServiceError> {
        Ok(SqliteUserRepository::new(self.conn).find_by_username(username.trim())?)
    }

    /// Creates the zodiac profile from accumulated quiz weights.
    ///
    /// The inner sign is the sign with the highest weight. Signs missing from
    /// `sign_weights` count as zero.
    pub fn complete_quiz(
        &self,
        user_id: UserId,
        sign_weights: &BTreeMap<ZodiacSign, f64>,
        birth_sign: Option<ZodiacSign>,
    ) -> Result<ZodiacProfile, ProfileServiceError> {
        if sign_weights.values().any(|weight| !weight.is_finite()) {
            return Err(ProfileServiceError::InvalidWeights);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let users = SqliteUserRepository::new(&tx);
        let profiles = SqliteProfileRepository::new(&tx);

        let mut user = users
            .get_user(user_id)?
            .ok_or(ProfileServiceError::UserNotFound(user_id))?;
        if profiles.get_profile(user_id)?.is_some() {
            return Err(ProfileServiceError::ProfileAlreadyExists(user_id));
        }

        let inner_sign = strongest_sign(sign_weights);
        let mut profile = ZodiacProfile::new(user_id, inner_sign, birth_sign);
        profile.sign_progress = ZodiacSign::ALL
            .into_iter()
            .map(|sign| (sign, sign_weights.get(&sign).copied().unwrap_or(0.0)))
            .collect();
        profiles.create_profile(&profile)?;

        user.completed_initial_quiz = true;
        users.update_user(&user)?;
        tx.commit()?;

        info!(
            "event=quiz_complete module=service status=ok user_id={} inner_sign={}",
            user_id,
            inner_sign.code()
        );
        Ok(profile)
    }

    /// `None` means the user has not completed onboarding yet.
    pub fn get_profile(&self, user_id: UserId) -> Result<Option<ZodiacProfile>, ProfileServiceError> {
        Ok(SqliteProfileRepository::new(self.conn).get_profile(user_id)?)
    }

    /// Per-sign levels sorted strongest first.
    pub fn sign_stats(&self, user_id: UserId) -> Result<Vec<SignStat>, ProfileServiceError> {
        let profile = self
            .get_profile(user_id)?
            .ok_or(ProfileServiceError::ProfileMissing(user_id))?;
        Ok(sign_stats(&profile))
    }
}

/// Highest-weight sign; ties go to canonical order.
pub fn strongest_sign(sign_weights: &BTreeMap<ZodiacSign, f64>) -> ZodiacSign {
    let weight = |sign: ZodiacSign| sign_weights.get(&sign).copied().unwrap_or(0.0);
    let mut best = ZodiacSign::ALL[0];
    for sign in ZodiacSign::ALL.into_iter().skip(1) {
        if weight(sign) > weight(best) {
            best = sign;
        }
    }
    best
}
