//! Task completion rules.
//!
//! # Responsibility
//! - Apply the in-memory effects of completing a task: status, user
//!   experience, sign experience and inner-sign drift.
//!
//! # Invariants
//! - A task completes at most once; its reward is granted exactly once.
//! - A task without a target sign never triggers a sign change.

use crate::model::profile::ZodiacProfile;
use crate::model::sign::ZodiacSign;
use crate::model::task::{Task, TaskTransitionError};
use crate::model::user::User;
use crate::rules::leveling::{add_sign_experience, apply_sign_change};

/// Flags and counters describing what a completion changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub experience_gained: u32,
    pub user_leveled_up: bool,
    pub new_user_level: u32,
    pub sign_level_up: bool,
    pub sign_levels_gained: u32,
    pub sign_changed: bool,
    pub new_sign: Option<ZodiacSign>,
    /// Filled by the caller after stale-task cleanup.
    pub old_tasks_removed: usize,
}

/// Completes `task` and applies its rewards to `user` and `profile`.
///
/// `profile` is `None` for users who have not finished onboarding; only user
/// experience is updated in that case. Stale-task cleanup is left to the
/// caller when `new_sign` is set.
pub fn complete_task(
    user: &mut User,
    profile: Option<&mut ZodiacProfile>,
    task: &mut Task,
    now_ms: i64,
) -> Result<CompletionReport, TaskTransitionError> {
    task.complete(now_ms)?;

    let reward = task.experience_reward;
    let user_leveled_up = user.add_experience(reward);

    let mut report = CompletionReport {
        experience_gained: reward,
        user_leveled_up,
        new_user_level: user.level(),
        sign_level_up: false,
        sign_levels_gained: 0,
        sign_changed: false,
        new_sign: None,
        old_tasks_removed: 0,
    };

    if let (Some(sign), Some(profile)) = (task.target_sign, profile) {
        let level_up = add_sign_experience(profile, sign, reward);
        report.sign_level_up = level_up.levels_gained > 0;
        report.sign_levels_gained = level_up.levels_gained;

        if let Some(new_sign) = apply_sign_change(profile) {
            report.sign_changed = true;
            report.new_sign = Some(new_sign);
        }
    }

    Ok(report)
}
