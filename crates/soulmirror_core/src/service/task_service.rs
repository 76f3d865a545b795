//! Task lifecycle use-cases.
//!
//! # Responsibility
//! - Start and complete tasks, applying rewards and inner-sign drift.
//! - Remove stale tasks after the inner sign changes.
//! - Keep the active backlog filled and run the weekly generation batch.
//!
//! # Invariants
//! - Completion, its rewards and stale cleanup commit together or not at all.
//! - Drafts are generated before any write; no transaction spans a
//!   generation call.
//! - A draft is stored only if, inside the write transaction, the inner sign
//!   it was drafted for is still current, the backlog is still short and its
//!   title is still new. Otherwise it is discarded.
//! - A failure for one user never aborts the weekly batch.

use crate::ai::{generate_unique_task, AiAgent, TextGenerator, UniqueTaskOutcome};
use crate::config::TaskPolicy;
use crate::model::now_epoch_ms;
use crate::model::profile::ZodiacProfile;
use crate::model::sign::ZodiacSign;
use crate::model::task::{Task, TaskId, TaskStatus, TaskTransitionError};
use crate::model::user::{User, UserId};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::rules::lifecycle::{self, CompletionReport};
use log::{info, warn};
use rand::Rng;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Reward range for tasks created while refilling the backlog.
pub const BACKLOG_REWARD: RangeInclusive<u32> = 100..=200;
/// Reward range for weekly tasks.
pub const WEEKLY_REWARD: RangeInclusive<u32> = 80..=150;
/// Look-back window of the weekly batch.
pub const WEEKLY_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;
/// Users with this many tasks assigned inside the window are skipped.
pub const WEEKLY_RECENT_LIMIT: usize = 3;
/// Completed tasks shown on the board.
pub const COMPLETED_BOARD_LIMIT: u32 = 10;

#[derive(Debug)]
pub enum TaskServiceError {
    UserNotFound(UserId),
    /// Task does not exist or belongs to another user.
    TaskNotFound(TaskId),
    Transition(TaskTransitionError),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Transition(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UserNotFound(_) | Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for TaskServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

impl From<TaskTransitionError> for TaskServiceError {
    fn from(value: TaskTransitionError) -> Self {
        Self::Transition(value)
    }
}

/// Outcome of one backlog refill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacklogReport {
    pub created: usize,
    /// Created tasks whose title duplicates an earlier one.
    pub degraded: usize,
    /// Drafts dropped because the backlog changed while they were generated.
    pub discarded: usize,
}

/// Outcome of one weekly batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyReport {
    pub users_seen: usize,
    pub created: usize,
    pub skipped_recent: usize,
    pub skipped_no_profile: usize,
    /// Drafts whose title was taken while they were generated.
    pub discarded: usize,
    pub failed: usize,
}

/// User tasks grouped by status, newest assignment first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    pub assigned: Vec<Task>,
    pub in_progress: Vec<Task>,
    /// At most `COMPLETED_BOARD_LIMIT` entries.
    pub completed: Vec<Task>,
}

enum WeeklyOutcome {
    Created,
    SkippedRecent,
    SkippedNoProfile,
    Discarded,
}

pub struct TaskService<'a, G> {
    conn: &'a Connection,
    agent: &'a AiAgent<G>,
    policy: TaskPolicy,
}

impl<'a, G: TextGenerator> TaskService<'a, G> {
    pub fn new(conn: &'a Connection, agent: &'a AiAgent<G>, policy: TaskPolicy) -> Self {
        Self {
            conn,
            agent,
            policy,
        }
    }

    /// Moves an assigned task to `in_progress`.
    pub fn start_task(&self, user_id: UserId, task_id: TaskId) -> Result<Task, TaskServiceError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tasks = SqliteTaskRepository::new(&tx);
        let mut task = owned_task(&tasks, user_id, task_id)?;
        task.start()?;
        tasks.update_task(&task)?;
        tx.commit()?;

        info!(
            "event=task_start module=service status=ok task_id={} user_id={}",
            task.id, user_id
        );
        Ok(task)
    }

    /// Completes a task and applies its rewards.
    ///
    /// When the inner sign changes, stale tasks are removed in the same
    /// transaction and counted in `old_tasks_removed`.
    pub fn complete_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> Result<CompletionReport, TaskServiceError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let users = SqliteUserRepository::new(&tx);
        let profiles = SqliteProfileRepository::new(&tx);
        let tasks = SqliteTaskRepository::new(&tx);

        let mut task = owned_task(&tasks, user_id, task_id)?;
        let mut user = users
            .get_user(user_id)?
            .ok_or(TaskServiceError::UserNotFound(user_id))?;
        let mut profile = profiles.get_profile(user_id)?;

        let mut report =
            lifecycle::complete_task(&mut user, profile.as_mut(), &mut task, now_epoch_ms())?;

        tasks.update_task(&task)?;
        users.update_user(&user)?;
        if let (Some(profile), Some(_)) = (profile.as_ref(), task.target_sign) {
            profiles.update_profile(profile)?;
        }
        if let Some(new_sign) = report.new_sign {
            report.old_tasks_removed = tasks.delete_stale_tasks(user_id, new_sign)?;
        }
        tx.commit()?;

        info!(
            "event=task_complete module=service status=ok task_id={} user_id={} xp={} sign_changed={} removed={}",
            task.id,
            user_id,
            report.experience_gained,
            report.sign_changed,
            report.old_tasks_removed
        );
        Ok(report)
    }

    /// Deletes active tasks that do not target `new_sign`.
    pub fn cleanup_stale_tasks(
        &self,
        user_id: UserId,
        new_sign: ZodiacSign,
    ) -> Result<usize, TaskServiceError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = SqliteTaskRepository::new(&tx).delete_stale_tasks(user_id, new_sign)?;
        tx.commit()?;

        info!(
            "event=task_cleanup module=service status=ok user_id={} sign={} removed={}",
            user_id,
            new_sign.code(),
            removed
        );
        Ok(removed)
    }

    /// Tops up active tasks for the current inner sign to `min_active`.
    ///
    /// Users without a profile get nothing. At most `backlog_retry_budget`
    /// drafts are requested per call, counting discarded ones. Each round
    /// re-reads the inner sign, so a sign change during the refill moves the
    /// remaining rounds to the new sign.
    pub fn ensure_task_backlog<R: Rng + ?Sized>(
        &self,
        user_id: UserId,
        rng: &mut R,
    ) -> Result<BacklogReport, TaskServiceError> {
        let profiles = SqliteProfileRepository::new(self.conn);
        let tasks = SqliteTaskRepository::new(self.conn);
        let mut report = BacklogReport::default();

        for _ in 0..self.policy.backlog_retry_budget {
            let Some(profile) = profiles.get_profile(user_id)? else {
                break;
            };
            let sign = profile.inner_sign;
            if tasks.count_active_for_sign(user_id, sign)? >= self.policy.min_active {
                break;
            }

            let titles = tasks.list_titles(user_id)?;
            let outcome =
                generate_unique_task(self.agent, rng, sign, &titles, self.policy.max_attempts);
            let reward = rng.gen_range(BACKLOG_REWARD);
            let degraded = outcome.degraded;

            if self.store_backlog_task(user_id, sign, outcome, reward)? {
                report.created += 1;
                if degraded {
                    report.degraded += 1;
                }
            } else {
                report.discarded += 1;
            }
        }

        info!(
            "event=task_backlog module=service status=ok user_id={} created={} degraded={} discarded={}",
            user_id, report.created, report.degraded, report.discarded
        );
        Ok(report)
    }

    /// Assigns one weekly task to every onboarded user who needs one.
    pub fn generate_weekly_tasks<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now_ms: i64,
    ) -> Result<WeeklyReport, TaskServiceError> {
        let users = SqliteUserRepository::new(self.conn).list_onboarded_users()?;
        let mut report = WeeklyReport {
            users_seen: users.len(),
            ..WeeklyReport::default()
        };

        info!(
            "event=weekly_tasks module=service status=start users={}",
            report.users_seen
        );

        for user in &users {
            match self.weekly_task_for(user, rng, now_ms) {
                Ok(WeeklyOutcome::Created) => report.created += 1,
                Ok(WeeklyOutcome::SkippedRecent) => report.skipped_recent += 1,
                Ok(WeeklyOutcome::SkippedNoProfile) => report.skipped_no_profile += 1,
                Ok(WeeklyOutcome::Discarded) => report.discarded += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=weekly_tasks module=service status=error user_id={} error={}",
                        user.id, err
                    );
                }
            }
        }

        info!(
            "event=weekly_tasks module=service status=ok created={} skipped_recent={} skipped_no_profile={} discarded={} failed={}",
            report.created,
            report.skipped_recent,
            report.skipped_no_profile,
            report.discarded,
            report.failed
        );
        Ok(report)
    }

    /// Tasks grouped by status for display.
    pub fn list_tasks(&self, user_id: UserId) -> Result<TaskBoard, TaskServiceError> {
        let tasks = SqliteTaskRepository::new(self.conn);
        let by_status = |status: TaskStatus, limit: Option<u32>| {
            tasks.list_tasks(&TaskListQuery {
                user_id,
                status: Some(status),
                limit,
            })
        };

        Ok(TaskBoard {
            assigned: by_status(TaskStatus::Assigned, None)?,
            in_progress: by_status(TaskStatus::InProgress, None)?,
            completed: by_status(TaskStatus::Completed, Some(COMPLETED_BOARD_LIMIT))?,
        })
    }

    fn weekly_task_for<R: Rng + ?Sized>(
        &self,
        user: &User,
        rng: &mut R,
        now_ms: i64,
    ) -> Result<WeeklyOutcome, TaskServiceError> {
        let tasks = SqliteTaskRepository::new(self.conn);
        let recent = tasks.count_assigned_since(user.id, now_ms - WEEKLY_WINDOW_MS)?;
        if recent >= WEEKLY_RECENT_LIMIT {
            return Ok(WeeklyOutcome::SkippedRecent);
        }

        let Some(profile) = SqliteProfileRepository::new(self.conn).get_profile(user.id)? else {
            return Ok(WeeklyOutcome::SkippedNoProfile);
        };
        let target = least_progress_sign(&profile)
            .unwrap_or_else(|| ZodiacSign::ALL[rng.gen_range(0..ZodiacSign::ALL.len())]);

        let titles = tasks.list_titles(user.id)?;
        let outcome = generate_unique_task(self.agent, rng, target, &titles, self.policy.max_attempts);
        let reward = rng.gen_range(WEEKLY_REWARD);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tasks = SqliteTaskRepository::new(&tx);
        if tasks.count_assigned_since(user.id, now_ms - WEEKLY_WINDOW_MS)? >= WEEKLY_RECENT_LIMIT {
            return Ok(WeeklyOutcome::SkippedRecent);
        }
        if SqliteProfileRepository::new(&tx).get_profile(user.id)?.is_none() {
            return Ok(WeeklyOutcome::SkippedNoProfile);
        }
        if !outcome.degraded && title_taken(&tasks.list_titles(user.id)?, &outcome.draft.title) {
            info!(
                "event=weekly_task module=service status=discarded user_id={} reason=title_taken",
                user.id
            );
            return Ok(WeeklyOutcome::Discarded);
        }

        let degraded = outcome.degraded;
        let task = Task::from_draft(user.id, outcome.draft, Some(target), reward, now_ms);
        tasks.create_task(&task)?;
        tx.commit()?;

        info!(
            "event=weekly_task module=service status=ok user_id={} sign={} reward={} degraded={}",
            user.id,
            target.code(),
            reward,
            degraded
        );
        Ok(WeeklyOutcome::Created)
    }

    /// Stores a backlog draft unless the backlog moved on while it was
    /// generated. Returns whether the task was created.
    fn store_backlog_task(
        &self,
        user_id: UserId,
        sign: ZodiacSign,
        outcome: UniqueTaskOutcome,
        reward: u32,
    ) -> Result<bool, TaskServiceError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tasks = SqliteTaskRepository::new(&tx);

        let current_sign = SqliteProfileRepository::new(&tx)
            .get_profile(user_id)?
            .map(|profile| profile.inner_sign);
        let reason = if current_sign != Some(sign) {
            Some("sign_moved")
        } else if tasks.count_active_for_sign(user_id, sign)? >= self.policy.min_active {
            Some("backlog_full")
        } else if !outcome.degraded
            && title_taken(&tasks.list_titles(user_id)?, &outcome.draft.title)
        {
            Some("title_taken")
        } else {
            None
        };
        if let Some(reason) = reason {
            info!(
                "event=task_backlog module=service status=discarded user_id={} sign={} reason={}",
                user_id,
                sign.code(),
                reason
            );
            return Ok(false);
        }

        let task = Task::from_draft(user_id, outcome.draft, Some(sign), reward, now_epoch_ms());
        tasks.create_task(&task)?;
        tx.commit()?;
        Ok(true)
    }
}

fn title_taken(titles: &[String], title: &str) -> bool {
    let title = title.trim();
    titles.iter().any(|existing| existing.trim() == title)
}

/// Sign with the lowest legacy progress weight; ties go to canonical order.
///
/// Returns `None` when the profile carries no progress weights at all.
pub fn least_progress_sign(profile: &ZodiacProfile) -> Option<ZodiacSign> {
    if profile.sign_progress.is_empty() {
        return None;
    }
    let mut best = ZodiacSign::ALL[0];
    let mut best_progress = profile.sign_progress(best);
    for sign in ZodiacSign::ALL.into_iter().skip(1) {
        let progress = profile.sign_progress(sign);
        if progress < best_progress {
            best = sign;
            best_progress = progress;
        }
    }
    Some(best)
}

fn owned_task(
    tasks: &SqliteTaskRepository<'_>,
    user_id: UserId,
    task_id: TaskId,
) -> Result<Task, TaskServiceError> {
    tasks
        .get_task(task_id)?
        .filter(|task| task.user_id == user_id)
        .ok_or(TaskServiceError::TaskNotFound(task_id))
}
