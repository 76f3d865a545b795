//! Advice of the day.
//!
//! # Invariants
//! - At most one advice per (user, date); later requests return the stored one.
//! - Advice starts hidden; `reveal_advice` only ever sets the flag.

use crate::ai::{AiAgent, TextGenerator};
use crate::model::journal::DailyAdvice;
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::journal_repo::{JournalRepository, SqliteJournalRepository};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::service::{ServiceError, ServiceResult};
use chrono::{Local, NaiveDate};
use log::info;
use rand::Rng;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

pub struct AdviceService<'a, G> {
    conn: &'a Connection,
    agent: &'a AiAgent<G>,
}

impl<'a, G: TextGenerator> AdviceService<'a, G> {
    pub fn new(conn: &'a Connection, agent: &'a AiAgent<G>) -> Self {
        Self { conn, agent }
    }

    pub fn today_advice<R: Rng + ?Sized>(
        &self,
        user_id: UserId,
        rng: &mut R,
    ) -> ServiceResult<DailyAdvice> {
        self.advice_for(user_id, Local::now().date_naive(), rng)
    }

    /// Returns the advice for `date`, generating it on first request.
    pub fn advice_for<R: Rng + ?Sized>(
        &self,
        user_id: UserId,
        date: NaiveDate,
        rng: &mut R,
    ) -> ServiceResult<DailyAdvice> {
        if let Some(existing) = SqliteJournalRepository::new(self.conn).get_advice(user_id, date)? {
            return Ok(existing);
        }

        let profile = SqliteProfileRepository::new(self.conn)
            .get_profile(user_id)?
            .ok_or(ServiceError::ProfileMissing(user_id))?;
        let text = self.agent.daily_advice(rng, profile.inner_sign);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let journal = SqliteJournalRepository::new(&tx);
        // A concurrent request may have stored one meanwhile.
        if let Some(existing) = journal.get_advice(user_id, date)? {
            return Ok(existing);
        }
        let advice = DailyAdvice {
            id: Uuid::new_v4(),
            user_id,
            date,
            advice: text,
            is_revealed: false,
            created_at: now_epoch_ms(),
        };
        journal.create_advice(&advice)?;
        tx.commit()?;

        info!(
            "event=daily_advice module=service status=ok user_id={} date={}",
            user_id, date
        );
        Ok(advice)
    }

    /// Marks the advice for `date` revealed and returns its text.
    pub fn reveal_advice(&self, user_id: UserId, date: NaiveDate) -> ServiceResult<String> {
        let journal = SqliteJournalRepository::new(self.conn);
        let advice = journal
            .get_advice(user_id, date)?
            .ok_or(ServiceError::NotFound("daily advice"))?;
        if !advice.is_revealed {
            journal.set_advice_revealed(advice.id)?;
        }
        Ok(advice.advice)
    }
}
