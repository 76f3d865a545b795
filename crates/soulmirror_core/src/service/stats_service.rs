//! Per-user statistics summary.

use crate::model::profile::XP_PER_LEVEL;
use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use crate::repo::journal_repo::{JournalRepository, SqliteJournalRepository};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::reading_repo::{ReadingRepository, SqliteReadingRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskCounts, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::rules::leveling::{sign_stats, SignStat};
use crate::service::{ServiceError, ServiceResult};
use rusqlite::Connection;

/// Average emotion reported when the user has no entries yet.
pub const DEFAULT_AVERAGE_EMOTION: f64 = 5.0;
/// Signs listed in `top_signs`.
pub const TOP_SIGNS: usize = 3;

/// Progress of the current inner sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSign {
    pub sign: ZodiacSign,
    pub level: u32,
    pub experience: u32,
    pub progress_percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub username: String,
    pub level: u32,
    pub total_experience: u64,
    pub tasks: TaskCounts,
    pub entries: usize,
    /// Rounded to one decimal.
    pub average_emotion: f64,
    pub tarot_readings: usize,
    /// `None` before onboarding.
    pub current_sign: Option<CurrentSign>,
    pub top_signs: Vec<SignStat>,
}

pub struct StatsService<'a> {
    conn: &'a Connection,
}

impl<'a> StatsService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn user_stats(&self, user_id: UserId) -> ServiceResult<UserStats> {
        let user = SqliteUserRepository::new(self.conn)
            .get_user(user_id)?
            .ok_or(ServiceError::UserNotFound(user_id))?;
        let journal = SqliteJournalRepository::new(self.conn);
        let profile = SqliteProfileRepository::new(self.conn).get_profile(user_id)?;

        let average_emotion = journal
            .average_emotion(user_id)?
            .map_or(DEFAULT_AVERAGE_EMOTION, round_one_decimal);

        let (current_sign, top_signs) = match profile {
            Some(profile) => {
                let sign = profile.inner_sign;
                let experience = profile.sign_experience(sign);
                let current = CurrentSign {
                    sign,
                    level: profile.sign_level(sign),
                    experience,
                    progress_percent: experience * 100 / XP_PER_LEVEL,
                };
                let mut stats = sign_stats(&profile);
                stats.truncate(TOP_SIGNS);
                (Some(current), stats)
            }
            None => (None, Vec::new()),
        };

        Ok(UserStats {
            level: user.level(),
            total_experience: user.total_experience(),
            username: user.username,
            tasks: SqliteTaskRepository::new(self.conn).task_counts(user_id)?,
            entries: journal.count_entries(user_id)?,
            average_emotion,
            tarot_readings: SqliteReadingRepository::new(self.conn).count_readings(user_id)?,
            current_sign,
            top_signs,
        })
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::round_one_decimal;

    #[test]
    fn averages_round_to_one_decimal() {
        assert_eq!(round_one_decimal(6.666), 6.7);
        assert_eq!(round_one_decimal(5.0), 5.0);
    }
}
