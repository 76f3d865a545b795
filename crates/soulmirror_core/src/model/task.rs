//! Media recommendation task model.
//!
//! # Responsibility
//! - Define the task record and its forward-only status machine.
//! - Provide the draft shape produced by the recommendation engine.
//!
//! # Invariants
//! - Status only moves `assigned -> in_progress -> completed`, or directly
//!   `assigned -> completed`.
//! - `completed_at` is set if and only if status is `completed`.
//! - `title` is never blank.

use crate::model::sign::ZodiacSign;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Default reward for tasks created without an explicit amount.
pub const DEFAULT_TASK_REWARD: u32 = 100;

/// Kind of media a task recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Book,
    Movie,
    Series,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Book, TaskKind::Movie, TaskKind::Series];

    pub fn code(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == value)
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a permitted transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Assigned, Self::InProgress)
                | (Self::Assigned, Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }
}

/// Rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTransitionError {
    pub task_id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl Display for TaskTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task {} cannot move from `{}` to `{}`",
            self.task_id,
            self.from.code(),
            self.to.code()
        )
    }
}

impl Error for TaskTransitionError {}

/// Task record validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    CompletionTimestampMismatch,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::CompletionTimestampMismatch => {
                write!(f, "completed_at must be set exactly when status is completed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Recommendation produced by the generator, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub kind: TaskKind,
    pub title: String,
    pub author: Option<String>,
    pub description: String,
}

/// Persisted task assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub kind: TaskKind,
    pub title: String,
    pub author: Option<String>,
    pub description: String,
    pub target_sign: Option<ZodiacSign>,
    pub experience_reward: u32,
    pub status: TaskStatus,
    /// Unix epoch milliseconds.
    pub assigned_at: i64,
    /// Unix epoch milliseconds. Set when status is `completed`.
    pub completed_at: Option<i64>,
}

impl Task {
    /// Builds an `assigned` task from a draft.
    pub fn from_draft(
        user_id: UserId,
        draft: TaskDraft,
        target_sign: Option<ZodiacSign>,
        experience_reward: u32,
        assigned_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: draft.kind,
            title: draft.title,
            author: draft.author,
            description: draft.description,
            target_sign,
            experience_reward,
            status: TaskStatus::Assigned,
            assigned_at,
            completed_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if (self.status == TaskStatus::Completed) != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionTimestampMismatch);
        }
        Ok(())
    }

    /// Moves an assigned task to `in_progress`.
    pub fn start(&mut self) -> Result<(), TaskTransitionError> {
        self.transition(TaskStatus::InProgress)
    }

    /// Marks the task completed and stamps the completion time.
    pub fn complete(&mut self, now_ms: i64) -> Result<(), TaskTransitionError> {
        self.transition(TaskStatus::Completed)?;
        self.completed_at = Some(now_ms);
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), TaskTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskTransitionError {
                task_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
