//! Three-card tarot readings.

use crate::ai::{AiAgent, TextGenerator};
use crate::model::now_epoch_ms;
use crate::model::reading::TarotReading;
use crate::model::user::UserId;
use crate::repo::reading_repo::{ReadingRepository, SqliteReadingRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::rules::tarot::draw_spread;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

/// Readings shown in the history view.
pub const HISTORY_LIMIT: u32 = 10;

pub struct TarotService<'a, G> {
    conn: &'a Connection,
    agent: &'a AiAgent<G>,
}

impl<'a, G: TextGenerator> TarotService<'a, G> {
    pub fn new(conn: &'a Connection, agent: &'a AiAgent<G>) -> Self {
        Self { conn, agent }
    }

    /// Draws a spread for `question`, interprets it and stores the reading.
    pub fn draw_reading<R: Rng + ?Sized>(
        &self,
        user_id: UserId,
        question: &str,
        rng: &mut R,
    ) -> ServiceResult<TarotReading> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::InvalidInput("tarot question must not be blank"));
        }
        if SqliteUserRepository::new(self.conn).get_user(user_id)?.is_none() {
            return Err(ServiceError::UserNotFound(user_id));
        }

        let cards = draw_spread(question, rng);
        let interpretation = self.agent.interpret_tarot(question, &cards);
        let reading = TarotReading {
            id: Uuid::new_v4(),
            user_id,
            question: question.to_string(),
            cards,
            interpretation,
            created_at: now_epoch_ms(),
        };
        SqliteReadingRepository::new(self.conn).create_reading(&reading)?;

        info!(
            "event=tarot_reading module=service status=ok user_id={} reading_id={}",
            user_id, reading.id
        );
        Ok(reading)
    }

    /// Most recent readings, newest first.
    pub fn history(&self, user_id: UserId) -> ServiceResult<Vec<TarotReading>> {
        Ok(SqliteReadingRepository::new(self.conn).list_readings(user_id, Some(HISTORY_LIMIT))?)
    }
}
