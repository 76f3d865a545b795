//! Daily entry and daily advice persistence.
//!
//! # Invariants
//! - At most one `daily_advice` row per (user, date); the schema enforces it.
//! - Emotion levels outside `1..=10` are rejected on read.

use crate::model::journal::{
    AdviceId, DailyAdvice, DailyEntry, EntryId, MAX_EMOTION_LEVEL, MIN_EMOTION_LEVEL,
};
use crate::model::user::UserId;
use crate::repo::{
    bool_to_int, count_to_usize, decode_sign_map, encode_sign_map, format_date, int_to_bool,
    parse_date, parse_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    entry_date,
    event_description,
    emotion_level,
    advice,
    experience_gained,
    sign_influences,
    created_at
FROM daily_entries";

const ADVICE_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    advice_date,
    advice,
    is_revealed,
    created_at
FROM daily_advice";

pub trait JournalRepository {
    fn create_entry(&self, entry: &DailyEntry) -> RepoResult<EntryId>;
    /// Lists entries newest first.
    fn list_entries(&self, user_id: UserId, limit: Option<u32>) -> RepoResult<Vec<DailyEntry>>;
    fn count_entries(&self, user_id: UserId) -> RepoResult<usize>;
    /// Mean emotion level, `None` when the user has no entries.
    fn average_emotion(&self, user_id: UserId) -> RepoResult<Option<f64>>;

    fn create_advice(&self, advice: &DailyAdvice) -> RepoResult<AdviceId>;
    fn get_advice(&self, user_id: UserId, date: NaiveDate) -> RepoResult<Option<DailyAdvice>>;
    fn set_advice_revealed(&self, id: AdviceId) -> RepoResult<()>;
    fn delete_all_advice(&self) -> RepoResult<usize>;
}

pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn create_entry(&self, entry: &DailyEntry) -> RepoResult<EntryId> {
        check_emotion(entry.emotion_level)?;
        self.conn.execute(
            "INSERT INTO daily_entries (
                uuid,
                user_uuid,
                entry_date,
                event_description,
                emotion_level,
                advice,
                experience_gained,
                sign_influences,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                format_date(entry.date),
                entry.event_description.as_str(),
                i64::from(entry.emotion_level),
                entry.advice.as_str(),
                i64::from(entry.experience_gained),
                encode_sign_map(&entry.sign_influences, "daily_entries.sign_influences")?,
                entry.created_at,
            ],
        )?;
        Ok(entry.id)
    }

    fn list_entries(&self, user_id: UserId, limit: Option<u32>) -> RepoResult<Vec<DailyEntry>> {
        let sql = format!(
            "{ENTRY_SELECT_SQL} WHERE user_uuid = ?1 ORDER BY created_at DESC, uuid ASC LIMIT ?2;"
        );
        let limit = limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id.to_string(), limit])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn count_entries(&self, user_id: UserId) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_entries WHERE user_uuid = ?1;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        count_to_usize(count, "daily_entries.count")
    }

    fn average_emotion(&self, user_id: UserId) -> RepoResult<Option<f64>> {
        let average: Option<f64> = self.conn.query_row(
            "SELECT AVG(emotion_level) FROM daily_entries WHERE user_uuid = ?1;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(average)
    }

    fn create_advice(&self, advice: &DailyAdvice) -> RepoResult<AdviceId> {
        self.conn.execute(
            "INSERT INTO daily_advice (uuid, user_uuid, advice_date, advice, is_revealed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                advice.id.to_string(),
                advice.user_id.to_string(),
                format_date(advice.date),
                advice.advice.as_str(),
                bool_to_int(advice.is_revealed),
                advice.created_at,
            ],
        )?;
        Ok(advice.id)
    }

    fn get_advice(&self, user_id: UserId, date: NaiveDate) -> RepoResult<Option<DailyAdvice>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ADVICE_SELECT_SQL} WHERE user_uuid = ?1 AND advice_date = ?2;"
        ))?;
        let row = stmt
            .query_row(params![user_id.to_string(), format_date(date)], |row| {
                Ok(parse_advice_row(row))
            })
            .optional()?;
        row.transpose()
    }

    fn set_advice_revealed(&self, id: AdviceId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE daily_advice SET is_revealed = 1 WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_all_advice(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM daily_advice;", [])?)
    }
}

fn check_emotion(level: u8) -> RepoResult<()> {
    if (MIN_EMOTION_LEVEL..=MAX_EMOTION_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(RepoError::InvalidData(format!(
            "emotion level `{level}` outside {MIN_EMOTION_LEVEL}..={MAX_EMOTION_LEVEL}"
        )))
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DailyEntry> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let date_text: String = row.get("entry_date")?;
    let emotion: i64 = row.get("emotion_level")?;
    let gained: i64 = row.get("experience_gained")?;
    let influences_text: String = row.get("sign_influences")?;

    let emotion_level = u8::try_from(emotion).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid emotion level `{emotion}` in daily_entries.emotion_level"
        ))
    })?;
    check_emotion(emotion_level)?;

    Ok(DailyEntry {
        id: parse_uuid(&uuid_text, "daily_entries.uuid")?,
        user_id: parse_uuid(&user_text, "daily_entries.user_uuid")?,
        date: parse_date(&date_text, "daily_entries.entry_date")?,
        event_description: row.get("event_description")?,
        emotion_level,
        advice: row.get("advice")?,
        experience_gained: u32::try_from(gained).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid experience `{gained}` in daily_entries.experience_gained"
            ))
        })?,
        sign_influences: decode_sign_map(&influences_text, "daily_entries.sign_influences")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_advice_row(row: &Row<'_>) -> RepoResult<DailyAdvice> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let date_text: String = row.get("advice_date")?;

    Ok(DailyAdvice {
        id: parse_uuid(&uuid_text, "daily_advice.uuid")?,
        user_id: parse_uuid(&user_text, "daily_advice.user_uuid")?,
        date: parse_date(&date_text, "daily_advice.advice_date")?,
        advice: row.get("advice")?,
        is_revealed: int_to_bool(row.get("is_revealed")?, "daily_advice.is_revealed")?,
        created_at: row.get("created_at")?,
    })
}
