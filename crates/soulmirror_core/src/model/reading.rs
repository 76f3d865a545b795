//! Divination records: tarot readings and natal charts.
//!
//! # Invariants
//! - A tarot spread has exactly one card per `SpreadPosition`, no repeats.
//! - A natal chart has 12 houses, house `n` stored at index `n - 1`.
//! - Planet houses are in `1..=12`, degrees in `0..=29`.

use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReadingId = Uuid;
pub type ChartId = Uuid;

/// Slot of a three-card spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPosition {
    Past,
    Present,
    Future,
}

impl SpreadPosition {
    pub const ALL: [SpreadPosition; 3] = [Self::Past, Self::Present, Self::Future];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Past => "Прошлое",
            Self::Present => "Настоящее",
            Self::Future => "Будущее",
        }
    }
}

/// A drawn card with its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotCard {
    pub position: SpreadPosition,
    pub card: String,
    pub meaning: String,
}

/// Persisted tarot reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotReading {
    pub id: ReadingId,
    pub user_id: UserId,
    pub question: String,
    pub cards: Vec<TarotCard>,
    pub interpretation: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Bodies placed in a simplified natal chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Planet {
    pub const ALL: [Planet; 7] = [
        Self::Sun,
        Self::Moon,
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sun => "Солнце",
            Self::Moon => "Луна",
            Self::Mercury => "Меркурий",
            Self::Venus => "Венера",
            Self::Mars => "Марс",
            Self::Jupiter => "Юпитер",
            Self::Saturn => "Сатурн",
        }
    }
}

/// Sign, house and degree of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub planet: Planet,
    pub sign: ZodiacSign,
    pub house: u8,
    pub degree: u8,
}

/// Generated chart geometry, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub planets: Vec<PlanetPosition>,
    pub houses: Vec<ZodiacSign>,
}

impl ChartLayout {
    pub fn position_of(&self, planet: Planet) -> Option<&PlanetPosition> {
        self.planets.iter().find(|position| position.planet == planet)
    }
}

/// Interpretation sections attached to a chart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NatalReadings {
    pub personality: String,
    pub career: String,
    pub relationships: String,
    pub life_purpose: String,
}

/// Persisted natal chart; one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatalChart {
    pub id: ChartId,
    pub user_id: UserId,
    pub birth_date: NaiveDate,
    pub birth_time: Option<NaiveTime>,
    pub birth_place: String,
    pub layout: ChartLayout,
    pub summary: String,
    pub readings: NatalReadings,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}
