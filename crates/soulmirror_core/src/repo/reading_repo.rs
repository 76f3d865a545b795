//! Tarot reading and natal chart persistence.
//!
//! # Invariants
//! - Card spreads, chart layouts and readings are stored as JSON documents.
//! - One natal chart per user; `upsert_chart` replaces the previous one.

use crate::model::reading::{ChartId, NatalChart, ReadingId, TarotReading};
use crate::model::user::UserId;
use crate::repo::{
    count_to_usize, format_date, from_json, parse_date, parse_uuid, to_json, RepoError, RepoResult,
};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

const READING_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    question,
    cards,
    interpretation,
    created_at
FROM tarot_readings";

const CHART_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    birth_date,
    birth_time,
    birth_place,
    layout,
    summary,
    readings,
    created_at,
    updated_at
FROM natal_charts";

pub trait ReadingRepository {
    fn create_reading(&self, reading: &TarotReading) -> RepoResult<ReadingId>;
    /// Lists readings newest first.
    fn list_readings(&self, user_id: UserId, limit: Option<u32>) -> RepoResult<Vec<TarotReading>>;
    fn count_readings(&self, user_id: UserId) -> RepoResult<usize>;
    fn delete_all_readings(&self) -> RepoResult<usize>;

    fn upsert_chart(&self, chart: &NatalChart) -> RepoResult<ChartId>;
    fn get_chart(&self, user_id: UserId) -> RepoResult<Option<NatalChart>>;
    fn delete_all_charts(&self) -> RepoResult<usize>;
}

pub struct SqliteReadingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReadingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReadingRepository for SqliteReadingRepository<'_> {
    fn create_reading(&self, reading: &TarotReading) -> RepoResult<ReadingId> {
        self.conn.execute(
            "INSERT INTO tarot_readings (uuid, user_uuid, question, cards, interpretation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                reading.id.to_string(),
                reading.user_id.to_string(),
                reading.question.as_str(),
                to_json(&reading.cards, "tarot_readings.cards")?,
                reading.interpretation.as_str(),
                reading.created_at,
            ],
        )?;
        Ok(reading.id)
    }

    fn list_readings(&self, user_id: UserId, limit: Option<u32>) -> RepoResult<Vec<TarotReading>> {
        let sql = format!(
            "{READING_SELECT_SQL} WHERE user_uuid = ?1 ORDER BY created_at DESC, uuid ASC LIMIT ?2;"
        );
        let limit = limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id.to_string(), limit])?;
        let mut readings = Vec::new();
        while let Some(row) = rows.next()? {
            readings.push(parse_reading_row(row)?);
        }
        Ok(readings)
    }

    fn count_readings(&self, user_id: UserId) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tarot_readings WHERE user_uuid = ?1;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        count_to_usize(count, "tarot_readings.count")
    }

    fn delete_all_readings(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM tarot_readings;", [])?)
    }

    fn upsert_chart(&self, chart: &NatalChart) -> RepoResult<ChartId> {
        self.conn.execute(
            "INSERT INTO natal_charts (
                uuid,
                user_uuid,
                birth_date,
                birth_time,
                birth_place,
                layout,
                summary,
                readings,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT (user_uuid) DO UPDATE SET
                birth_date = excluded.birth_date,
                birth_time = excluded.birth_time,
                birth_place = excluded.birth_place,
                layout = excluded.layout,
                summary = excluded.summary,
                readings = excluded.readings,
                updated_at = excluded.updated_at;",
            params![
                chart.id.to_string(),
                chart.user_id.to_string(),
                format_date(chart.birth_date),
                chart.birth_time.map(|time| time.format("%H:%M").to_string()),
                chart.birth_place.as_str(),
                to_json(&chart.layout, "natal_charts.layout")?,
                chart.summary.as_str(),
                to_json(&chart.readings, "natal_charts.readings")?,
                chart.created_at,
                chart.updated_at,
            ],
        )?;

        let stored: String = self.conn.query_row(
            "SELECT uuid FROM natal_charts WHERE user_uuid = ?1;",
            [chart.user_id.to_string()],
            |row| row.get(0),
        )?;
        parse_uuid(&stored, "natal_charts.uuid")
    }

    fn get_chart(&self, user_id: UserId) -> RepoResult<Option<NatalChart>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHART_SELECT_SQL} WHERE user_uuid = ?1;"))?;
        let row = stmt
            .query_row([user_id.to_string()], |row| Ok(parse_chart_row(row)))
            .optional()?;
        row.transpose()
    }

    fn delete_all_charts(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM natal_charts;", [])?)
    }
}

fn parse_reading_row(row: &Row<'_>) -> RepoResult<TarotReading> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let cards_text: String = row.get("cards")?;

    Ok(TarotReading {
        id: parse_uuid(&uuid_text, "tarot_readings.uuid")?,
        user_id: parse_uuid(&user_text, "tarot_readings.user_uuid")?,
        question: row.get("question")?,
        cards: from_json(&cards_text, "tarot_readings.cards")?,
        interpretation: row.get("interpretation")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_chart_row(row: &Row<'_>) -> RepoResult<NatalChart> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let date_text: String = row.get("birth_date")?;
    let time_text: Option<String> = row.get("birth_time")?;
    let layout_text: String = row.get("layout")?;
    let readings_text: String = row.get("readings")?;

    let birth_time = time_text
        .map(|value| {
            NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| {
                RepoError::InvalidData(format!("invalid time `{value}` in natal_charts.birth_time"))
            })
        })
        .transpose()?;

    Ok(NatalChart {
        id: parse_uuid(&uuid_text, "natal_charts.uuid")?,
        user_id: parse_uuid(&user_text, "natal_charts.user_uuid")?,
        birth_date: parse_date(&date_text, "natal_charts.birth_date")?,
        birth_time,
        birth_place: row.get("birth_place")?,
        layout: from_json(&layout_text, "natal_charts.layout")?,
        summary: row.get("summary")?,
        readings: from_json(&readings_text, "natal_charts.readings")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
