//! Daily journal entry use-cases.
//!
//! # Responsibility
//! - Turn an event description and emotion score into experience for the
//!   user and for the signs the event touches.
//! - Attach a generated reflection to each entry.
//!
//! # Invariants
//! - Emotion level is in `1..=10`; event text is not blank.
//! - User, profile, entry and stale cleanup commit in one transaction.
//! - Advice is generated before the transaction opens.

use crate::ai::{AiAgent, TextGenerator};
use crate::model::journal::{DailyEntry, MAX_EMOTION_LEVEL, MIN_EMOTION_LEVEL};
use crate::model::now_epoch_ms;
use crate::model::profile::ZodiacProfile;
use crate::model::sign::ZodiacSign;
use crate::model::user::{User, UserId};
use crate::repo::journal_repo::{JournalRepository, SqliteJournalRepository};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::rules::influence::{base_experience, calculate_influence};
use crate::rules::leveling::{add_sign_experience, apply_sign_change, LevelUpResult};
use chrono::{Local, NaiveDate};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Entries returned by `list_entries` when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug)]
pub enum EntryServiceError {
    InvalidEmotion(u8),
    BlankEvent,
    UserNotFound(UserId),
    /// Entries need a completed onboarding quiz.
    ProfileMissing(UserId),
    Repo(RepoError),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmotion(level) => write!(
                f,
                "emotion level {level} outside {MIN_EMOTION_LEVEL}..={MAX_EMOTION_LEVEL}"
            ),
            Self::BlankEvent => write!(f, "event description must not be blank"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ProfileMissing(id) => write!(f, "zodiac profile missing for user {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EntryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for EntryServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Persisted entry plus the progression it caused.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryReport {
    pub entry: DailyEntry,
    pub user_leveled_up: bool,
    pub new_user_level: u32,
    /// Only signs that gained at least one level.
    pub sign_level_ups: Vec<LevelUpResult>,
    pub sign_changed: bool,
    pub new_sign: Option<ZodiacSign>,
    pub old_tasks_removed: usize,
}

pub struct EntryService<'a, G> {
    conn: &'a Connection,
    agent: &'a AiAgent<G>,
}

impl<'a, G: TextGenerator> EntryService<'a, G> {
    pub fn new(conn: &'a Connection, agent: &'a AiAgent<G>) -> Self {
        Self { conn, agent }
    }

    /// Records today's entry for the user.
    pub fn submit_entry(
        &self,
        user_id: UserId,
        event_description: &str,
        emotion_level: u8,
    ) -> Result<EntryReport, EntryServiceError> {
        self.submit_entry_on(user_id, Local::now().date_naive(), event_description, emotion_level)
    }

    /// Records an entry dated `date`.
    pub fn submit_entry_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
        event_description: &str,
        emotion_level: u8,
    ) -> Result<EntryReport, EntryServiceError> {
        if !(MIN_EMOTION_LEVEL..=MAX_EMOTION_LEVEL).contains(&emotion_level) {
            return Err(EntryServiceError::InvalidEmotion(emotion_level));
        }
        let event_description = event_description.trim();
        if event_description.is_empty() {
            return Err(EntryServiceError::BlankEvent);
        }

        let (user, profile) = load_player(self.conn, user_id)?;
        let experience = base_experience(emotion_level);
        let influences = calculate_influence(emotion_level, event_description);
        let advice = self.agent.entry_advice(
            profile.inner_sign,
            user.level(),
            event_description,
            emotion_level,
        );

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let (mut user, mut profile) = load_player(&tx, user_id)?;

        let user_leveled_up = user.add_experience(experience);
        let mut sign_level_ups = Vec::new();
        for (&sign, &influence) in &influences {
            let result = add_sign_experience(&mut profile, sign, rounded_experience(influence));
            if result.levels_gained > 0 {
                sign_level_ups.push(result);
            }
            *profile.sign_progress.entry(sign).or_insert(0.0) += influence;
        }
        let new_sign = apply_sign_change(&mut profile);

        let entry = DailyEntry {
            id: Uuid::new_v4(),
            user_id,
            date,
            event_description: event_description.to_string(),
            emotion_level,
            advice,
            experience_gained: experience,
            sign_influences: influences,
            created_at: now_epoch_ms(),
        };

        SqliteUserRepository::new(&tx).update_user(&user)?;
        SqliteProfileRepository::new(&tx).update_profile(&profile)?;
        SqliteJournalRepository::new(&tx).create_entry(&entry)?;
        let old_tasks_removed = match new_sign {
            Some(sign) => SqliteTaskRepository::new(&tx).delete_stale_tasks(user_id, sign)?,
            None => 0,
        };
        tx.commit()?;

        info!(
            "event=entry_submit module=service status=ok user_id={} entry_id={} xp={} sign_changed={} removed={}",
            user_id,
            entry.id,
            experience,
            new_sign.is_some(),
            old_tasks_removed
        );

        Ok(EntryReport {
            entry,
            user_leveled_up,
            new_user_level: user.level(),
            sign_level_ups,
            sign_changed: new_sign.is_some(),
            new_sign,
            old_tasks_removed,
        })
    }

    /// Entry history, newest first.
    pub fn list_entries(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<DailyEntry>, EntryServiceError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(SqliteJournalRepository::new(self.conn).list_entries(user_id, Some(limit))?)
    }
}

fn load_player(
    conn: &Connection,
    user_id: UserId,
) -> Result<(User, ZodiacProfile), EntryServiceError> {
    let user = SqliteUserRepository::new(conn)
        .get_user(user_id)?
        .ok_or(EntryServiceError::UserNotFound(user_id))?;
    let profile = SqliteProfileRepository::new(conn)
        .get_profile(user_id)?
        .ok_or(EntryServiceError::ProfileMissing(user_id))?;
    Ok((user, profile))
}

fn rounded_experience(influence: f64) -> u32 {
    if influence.is_finite() && influence > 0.0 {
        influence.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::rounded_experience;

    #[test]
    fn influence_rounds_to_nearest_point() {
        assert_eq!(rounded_experience(7.5), 8);
        assert_eq!(rounded_experience(7.49), 7);
        assert_eq!(rounded_experience(-3.0), 0);
        assert_eq!(rounded_experience(f64::NAN), 0);
    }
}
