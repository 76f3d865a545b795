//! Maps a journal event onto weighted per-sign experience.
//!
//! # Invariants
//! - Base experience is `max(10, emotion * 5)`.
//! - Only touched signs appear in the result; every value is positive.
//! - Keyword bonuses are additive and independent of match order.

use crate::model::sign::ZodiacSign;
use std::collections::BTreeMap;

/// Minimum experience granted for any entry.
pub const MIN_BASE_EXPERIENCE: u32 = 10;
/// Share of base experience added per keyword hit.
pub const KEYWORD_BONUS_RATIO: f64 = 0.3;

/// Coarse emotional band of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionBand {
    /// 7 and above.
    Uplifted,
    /// 3 and below.
    Strained,
    Neutral,
}

impl EmotionBand {
    pub fn of(emotion_level: u8) -> Self {
        if emotion_level >= 7 {
            Self::Uplifted
        } else if emotion_level <= 3 {
            Self::Strained
        } else {
            Self::Neutral
        }
    }

    /// Signs favored by this band and their multipliers of base experience.
    pub fn weights(self) -> &'static [(ZodiacSign, f64)] {
        match self {
            Self::Uplifted => &[
                (ZodiacSign::Leo, 1.2),
                (ZodiacSign::Sagittarius, 1.1),
                (ZodiacSign::Aries, 1.0),
            ],
            Self::Strained => &[
                (ZodiacSign::Scorpio, 1.2),
                (ZodiacSign::Capricorn, 1.1),
                (ZodiacSign::Pisces, 1.0),
            ],
            Self::Neutral => &[(ZodiacSign::Libra, 1.1), (ZodiacSign::Virgo, 1.0)],
        }
    }
}

/// Overall experience granted for an entry with the given emotion score.
pub fn base_experience(emotion_level: u8) -> u32 {
    (u32::from(emotion_level) * 5).max(MIN_BASE_EXPERIENCE)
}

/// Computes per-sign influence of an event.
///
/// `event_text` is matched case-insensitively against each sign's keywords;
/// every hit adds `0.3 * base` to that sign.
pub fn calculate_influence(emotion_level: u8, event_text: &str) -> BTreeMap<ZodiacSign, f64> {
    let base = f64::from(base_experience(emotion_level));
    let mut influences: BTreeMap<ZodiacSign, f64> = EmotionBand::of(emotion_level)
        .weights()
        .iter()
        .map(|&(sign, multiplier)| (sign, base * multiplier))
        .collect();

    let lowered = event_text.to_lowercase();
    for sign in ZodiacSign::ALL {
        let hits = sign
            .keywords()
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();
        if hits > 0 {
            *influences.entry(sign).or_insert(0.0) += base * KEYWORD_BONUS_RATIO * hits as f64;
        }
    }

    influences
}
