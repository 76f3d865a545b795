//! Zodiac profile: per-user store of sign progression.
//!
//! # Responsibility
//! - Hold typed per-sign experience/level maps and the inner/birth signs.
//! - Validate progression invariants at storage boundaries.
//!
//! # Invariants
//! - Missing experience entries read as `0`, missing levels read as `1`.
//! - Stored experience is always below `XP_PER_LEVEL`.
//! - Stored levels are always `>= 1`.
//! - `birth_sign` is set once at onboarding and never changed afterwards.

use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Experience needed for one sign level.
pub const XP_PER_LEVEL: u32 = 500;
/// Minimum level gap before the inner sign moves to the dominant sign.
pub const SIGN_CHANGE_THRESHOLD: u32 = 3;

/// Progression invariant violation found during validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileValidationError {
    ExperienceOutOfRange { sign: ZodiacSign, experience: u32 },
    LevelBelowOne { sign: ZodiacSign, level: u32 },
    NonFiniteProgress { sign: ZodiacSign },
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExperienceOutOfRange { sign, experience } => write!(
                f,
                "experience {experience} for `{sign}` must be below {XP_PER_LEVEL}"
            ),
            Self::LevelBelowOne { sign, level } => {
                write!(f, "level {level} for `{sign}` must be at least 1")
            }
            Self::NonFiniteProgress { sign } => {
                write!(f, "legacy progress for `{sign}` is not a finite number")
            }
        }
    }
}

impl Error for ProfileValidationError {}

/// Per-user zodiac progression record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZodiacProfile {
    pub user_id: UserId,
    pub birth_sign: Option<ZodiacSign>,
    pub inner_sign: ZodiacSign,
    /// Experience toward the next level of each sign.
    pub sign_experience: BTreeMap<ZodiacSign, u32>,
    /// Current level of each sign.
    pub sign_levels: BTreeMap<ZodiacSign, u32>,
    /// Legacy quiz/entry weights. Not part of the leveling invariants.
    pub sign_progress: BTreeMap<ZodiacSign, f64>,
}

impl ZodiacProfile {
    /// Creates a fresh profile with every sign at level 1 and no experience.
    pub fn new(user_id: UserId, inner_sign: ZodiacSign, birth_sign: Option<ZodiacSign>) -> Self {
        Self {
            user_id,
            birth_sign,
            inner_sign,
            sign_experience: BTreeMap::new(),
            sign_levels: BTreeMap::new(),
            sign_progress: BTreeMap::new(),
        }
    }

    /// Current level of `sign`, defaulting to 1.
    pub fn sign_level(&self, sign: ZodiacSign) -> u32 {
        self.sign_levels.get(&sign).copied().unwrap_or(1)
    }

    /// Experience accumulated toward the next level of `sign`, defaulting to 0.
    pub fn sign_experience(&self, sign: ZodiacSign) -> u32 {
        self.sign_experience.get(&sign).copied().unwrap_or(0)
    }

    /// Legacy progress weight of `sign`, defaulting to 0.
    pub fn sign_progress(&self, sign: ZodiacSign) -> f64 {
        self.sign_progress.get(&sign).copied().unwrap_or(0.0)
    }

    /// Checks progression invariants.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        for (&sign, &experience) in &self.sign_experience {
            if experience >= XP_PER_LEVEL {
                return Err(ProfileValidationError::ExperienceOutOfRange { sign, experience });
            }
        }
        for (&sign, &level) in &self.sign_levels {
            if level == 0 {
                return Err(ProfileValidationError::LevelBelowOne { sign, level });
            }
        }
        for (&sign, &progress) in &self.sign_progress {
            if !progress.is_finite() {
                return Err(ProfileValidationError::NonFiniteProgress { sign });
            }
        }
        Ok(())
    }
}
