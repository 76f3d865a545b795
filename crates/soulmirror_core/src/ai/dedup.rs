//! Bounded retry loop that keeps task titles unique per user.
//!
//! # Invariants
//! - At most `max_attempts` generations are requested (at least one).
//! - A draft whose title is not among the existing titles is returned as
//!   soon as it appears.
//! - After the last attempt the final draft is accepted even if it
//!   duplicates; the outcome is flagged `degraded`.

use crate::ai::agent::AiAgent;
use crate::ai::generator::TextGenerator;
use crate::model::sign::ZodiacSign;
use crate::model::task::TaskDraft;
use log::{info, warn};
use rand::Rng;
use std::collections::HashSet;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Accepted draft and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueTaskOutcome {
    pub draft: TaskDraft,
    /// Generations requested, `1..=max_attempts`.
    pub attempts: u32,
    /// True when the accepted title duplicates an existing one.
    pub degraded: bool,
}

/// Generates a task draft for `target_sign` whose title is new for the user.
///
/// `existing_titles` holds every title the user has had, oldest first.
/// Titles compare after trimming surrounding whitespace.
pub fn generate_unique_task<G, R>(
    agent: &AiAgent<G>,
    rng: &mut R,
    target_sign: ZodiacSign,
    existing_titles: &[String],
    max_attempts: u32,
) -> UniqueTaskOutcome
where
    G: TextGenerator,
    R: Rng + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let known: HashSet<&str> = existing_titles.iter().map(|title| title.trim()).collect();

    let mut attempts = 0;
    loop {
        attempts += 1;
        let draft = agent.recommend_task(rng, target_sign, existing_titles);
        let duplicate = known.contains(draft.title.trim());

        if !duplicate {
            info!(
                "event=task_dedup module=ai status=ok sign={} attempts={}",
                target_sign.code(),
                attempts
            );
            return UniqueTaskOutcome {
                draft,
                attempts,
                degraded: false,
            };
        }

        if attempts >= max_attempts {
            warn!(
                "event=task_dedup module=ai status=degraded sign={} attempts={} reason=duplicate_accepted",
                target_sign.code(),
                attempts
            );
            return UniqueTaskOutcome {
                draft,
                attempts,
                degraded: true,
            };
        }
    }
}
