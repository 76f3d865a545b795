//! Domain model for zodiac progression, tasks and journal records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep sign-keyed maps typed by the closed `ZodiacSign` enumeration.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds.

pub mod journal;
pub mod profile;
pub mod reading;
pub mod sign;
pub mod task;
pub mod user;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
