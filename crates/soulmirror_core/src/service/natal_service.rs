//! Natal chart generation and storage.
//!
//! # Invariants
//! - The layout depends only on birth date and birth sign.
//! - One chart per user; rebuilding keeps the chart id and creation time.

use crate::ai::{AiAgent, TextGenerator};
use crate::model::now_epoch_ms;
use crate::model::reading::NatalChart;
use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::reading_repo::{ReadingRepository, SqliteReadingRepository};
use crate::rules::natal::generate_layout;
use crate::service::{ServiceError, ServiceResult};
use chrono::{NaiveDate, NaiveTime};
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

/// Sign used when the profile has no birth sign.
pub const DEFAULT_BIRTH_SIGN: ZodiacSign = ZodiacSign::Aries;

/// Birth data supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthData {
    pub birth_date: NaiveDate,
    pub birth_time: Option<NaiveTime>,
    pub birth_place: String,
}

pub struct NatalService<'a, G> {
    conn: &'a Connection,
    agent: &'a AiAgent<G>,
}

impl<'a, G: TextGenerator> NatalService<'a, G> {
    pub fn new(conn: &'a Connection, agent: &'a AiAgent<G>) -> Self {
        Self { conn, agent }
    }

    /// Builds, interprets and stores the user's chart, replacing any earlier one.
    pub fn build_chart(&self, user_id: UserId, birth: BirthData) -> ServiceResult<NatalChart> {
        let profile = SqliteProfileRepository::new(self.conn)
            .get_profile(user_id)?
            .ok_or(ServiceError::ProfileMissing(user_id))?;
        let birth_sign = profile.birth_sign.unwrap_or(DEFAULT_BIRTH_SIGN);

        let layout = generate_layout(birth.birth_date, birth_sign);
        let readings = self.agent.interpret_natal(birth_sign, &layout);

        let readings_repo = SqliteReadingRepository::new(self.conn);
        let previous = readings_repo.get_chart(user_id)?;
        let now = now_epoch_ms();
        let mut chart = NatalChart {
            id: previous.as_ref().map_or_else(Uuid::new_v4, |chart| chart.id),
            user_id,
            birth_date: birth.birth_date,
            birth_time: birth.birth_time,
            birth_place: birth.birth_place.trim().to_string(),
            layout,
            summary: chart_summary(profile.birth_sign),
            readings,
            created_at: previous.as_ref().map_or(now, |chart| chart.created_at),
            updated_at: now,
        };
        chart.id = readings_repo.upsert_chart(&chart)?;

        info!(
            "event=natal_chart module=service status=ok user_id={} chart_id={} replaced={}",
            user_id,
            chart.id,
            previous.is_some()
        );
        Ok(chart)
    }

    pub fn get_chart(&self, user_id: UserId) -> ServiceResult<Option<NatalChart>> {
        Ok(SqliteReadingRepository::new(self.conn).get_chart(user_id)?)
    }
}

/// Headline stored with the chart.
pub fn chart_summary(birth_sign: Option<ZodiacSign>) -> String {
    match birth_sign {
        Some(sign) => format!("Натальная карта для {}", sign.display_name()),
        None => "Натальная карта для человека".to_string(),
    }
}
