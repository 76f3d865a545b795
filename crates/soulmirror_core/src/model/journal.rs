//! Daily journal records: emotional entries and the advice of the day.

use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type EntryId = Uuid;
pub type AdviceId = Uuid;

/// Lowest accepted emotion score.
pub const MIN_EMOTION_LEVEL: u8 = 1;
/// Highest accepted emotion score.
pub const MAX_EMOTION_LEVEL: u8 = 10;

/// One journal entry describing an event and how it felt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub event_description: String,
    /// 1 (worst) to 10 (best).
    pub emotion_level: u8,
    pub advice: String,
    pub experience_gained: u32,
    pub sign_influences: BTreeMap<ZodiacSign, f64>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Advice of the day; at most one per user and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAdvice {
    pub id: AdviceId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub advice: String,
    pub is_revealed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
