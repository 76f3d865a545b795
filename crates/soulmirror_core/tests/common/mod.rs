#![allow(dead_code)]

use rusqlite::Connection;
use soulmirror_core::model::sign::ZodiacSign;
use soulmirror_core::model::task::{Task, TaskDraft, TaskKind};
use soulmirror_core::model::user::UserId;
use soulmirror_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use soulmirror_core::service::profile_service::ProfileService;
use soulmirror_core::{GenerationError, TextGenerator};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

/// Replays scripted replies in order, then fails with `EmptyResponse`.
pub struct Scripted {
    replies: RefCell<VecDeque<String>>,
    calls: Cell<u32>,
}

impl Scripted {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: RefCell::new(replies.into_iter().map(Into::into).collect()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl TextGenerator for Scripted {
    fn generate(&self, _prompt: &str, _num_predict: u32) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Returns the same reply on every call.
pub struct Repeating {
    reply: String,
    calls: Cell<u32>,
}

impl Repeating {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl TextGenerator for Repeating {
    fn generate(&self, _prompt: &str, _num_predict: u32) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.reply.clone())
    }
}

/// Runs `interlude` once, before the first reply, then replays the script.
///
/// Lets a test change the database from another connection while a draft is
/// being generated.
pub struct Interleaved<'a> {
    script: Scripted,
    interlude: RefCell<Option<Box<dyn FnOnce() + 'a>>>,
}

impl<'a> Interleaved<'a> {
    pub fn new<I, S>(replies: I, interlude: impl FnOnce() + 'a) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Scripted::new(replies),
            interlude: RefCell::new(Some(Box::new(interlude))),
        }
    }

    pub fn calls(&self) -> u32 {
        self.script.calls()
    }
}

impl TextGenerator for Interleaved<'_> {
    fn generate(&self, prompt: &str, num_predict: u32) -> Result<String, GenerationError> {
        let interlude = self.interlude.borrow_mut().take();
        if let Some(interlude) = interlude {
            interlude();
        }
        self.script.generate(prompt, num_predict)
    }
}

/// Always unreachable.
pub struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _prompt: &str, _num_predict: u32) -> Result<String, GenerationError> {
        Err(GenerationError::Transport("connection refused".to_string()))
    }
}

/// Numbered recommendation replies with distinct titles.
pub fn task_replies(prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("Название: {prefix} {n}\nАвтор: Неизвестный автор\nОписание: История номер {n}."))
        .collect()
}

/// Registers `username` and completes the quiz with `inner` as the top sign.
pub fn onboarded_user(conn: &Connection, username: &str, inner: ZodiacSign) -> UserId {
    let profiles = ProfileService::new(conn);
    let user = profiles.register_user(username).unwrap();
    let weights = BTreeMap::from([(inner, 10.0)]);
    profiles.complete_quiz(user.id, &weights, Some(inner)).unwrap();
    user.id
}

/// Stores an assigned task directly, bypassing generation.
pub fn insert_task(
    conn: &Connection,
    user_id: UserId,
    title: &str,
    target: Option<ZodiacSign>,
    reward: u32,
    assigned_at: i64,
) -> Task {
    let task = Task::from_draft(
        user_id,
        TaskDraft {
            kind: TaskKind::Book,
            title: title.to_string(),
            author: None,
            description: "Описание.".to_string(),
        },
        target,
        reward,
        assigned_at,
    );
    SqliteTaskRepository::new(conn).create_task(&task).unwrap();
    task
}
