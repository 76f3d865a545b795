//! User account progression.
//!
//! # Invariants
//! - `total_experience` never decreases.
//! - `level` is derived from `total_experience` and never stored on its own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Experience needed for one overall user level.
pub const USER_XP_PER_LEVEL: u64 = 100;

/// Derives the overall user level from accumulated experience.
pub fn level_for_experience(total_experience: u64) -> u32 {
    let level = total_experience / USER_XP_PER_LEVEL + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Application user with overall progression counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    total_experience: u64,
    pub completed_initial_quiz: bool,
}

impl User {
    /// Creates a new user with zero experience.
    pub fn new(username: impl Into<String>) -> Self {
        Self::restore(Uuid::new_v4(), username, 0, false)
    }

    /// Rebuilds a user from persisted fields.
    pub fn restore(
        id: UserId,
        username: impl Into<String>,
        total_experience: u64,
        completed_initial_quiz: bool,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            total_experience,
            completed_initial_quiz,
        }
    }

    pub fn total_experience(&self) -> u64 {
        self.total_experience
    }

    pub fn level(&self) -> u32 {
        level_for_experience(self.total_experience)
    }

    /// Adds experience and reports whether the derived level increased.
    pub fn add_experience(&mut self, amount: u32) -> bool {
        let before = self.level();
        self.total_experience = self.total_experience.saturating_add(u64::from(amount));
        self.level() > before
    }
}
