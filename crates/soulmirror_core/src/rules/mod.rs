//! Pure progression and divination rules.
//!
//! # Responsibility
//! - Hold the game arithmetic free of storage and generation concerns.
//! - Operate on in-memory model values; callers persist the results.
//!
//! # See also
//! - `service` for the transactional use cases built on these rules.

pub mod influence;
pub mod leveling;
pub mod lifecycle;
pub mod natal;
pub mod tarot;
