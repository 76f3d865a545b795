//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist generated tasks and their lifecycle transitions.
//! - Serve the per-user queries the recommendation flow depends on.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Stale cleanup only ever touches active (`assigned`/`in_progress`) rows and
//!   never parses them, so a damaged active row cannot block a sign change.

use crate::model::sign::ZodiacSign;
use crate::model::task::{Task, TaskId, TaskKind, TaskStatus};
use crate::model::user::UserId;
use crate::repo::{count_to_usize, parse_optional_sign, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    kind,
    title,
    author,
    description,
    target_sign,
    experience_reward,
    status,
    assigned_at,
    completed_at
FROM tasks";

/// Query options for listing one user's tasks.
#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub user_id: UserId,
    pub status: Option<TaskStatus>,
    pub limit: Option<u32>,
}

impl TaskListQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            status: None,
            limit: None,
        }
    }
}

/// Aggregate task counters for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub completed_books: usize,
    pub completed_movies: usize,
    pub completed_series: usize,
}

pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists tasks newest assignment first.
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Every title ever assigned to the user, oldest first.
    fn list_titles(&self, user_id: UserId) -> RepoResult<Vec<String>>;
    fn count_active_for_sign(&self, user_id: UserId, sign: ZodiacSign) -> RepoResult<usize>;
    fn count_assigned_since(&self, user_id: UserId, since_ms: i64) -> RepoResult<usize>;
    /// Deletes active tasks aimed at any sign other than `new_sign`.
    fn delete_stale_tasks(&self, user_id: UserId, new_sign: ZodiacSign) -> RepoResult<usize>;
    fn task_counts(&self, user_id: UserId) -> RepoResult<TaskCounts>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                user_uuid,
                kind,
                title,
                author,
                description,
                target_sign,
                experience_reward,
                status,
                assigned_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                task.id.to_string(),
                task.user_id.to_string(),
                task.kind.code(),
                task.title.as_str(),
                task.author.as_deref(),
                task.description.as_str(),
                task.target_sign.map(|sign| sign.code()),
                i64::from(task.experience_reward),
                task.status.code(),
                task.assigned_at,
                task.completed_at,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                author = ?2,
                description = ?3,
                target_sign = ?4,
                experience_reward = ?5,
                status = ?6,
                completed_at = ?7
             WHERE uuid = ?8;",
            params![
                task.title.as_str(),
                task.author.as_deref(),
                task.description.as_str(),
                task.target_sign.map(|sign| sign.code()),
                i64::from(task.experience_reward),
                task.status.code(),
                task.completed_at,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(parse_task_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_uuid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.user_id.to_string())];

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }

        sql.push_str(" ORDER BY assigned_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn list_titles(&self, user_id: UserId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT title FROM tasks
             WHERE user_uuid = ?1
             ORDER BY assigned_at ASC, uuid ASC;",
        )?;
        let titles = stmt
            .query_map([user_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    fn count_active_for_sign(&self, user_id: UserId, sign: ZodiacSign) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_uuid = ?1
               AND target_sign = ?2
               AND status IN ('assigned', 'in_progress');",
            params![user_id.to_string(), sign.code()],
            |row| row.get(0),
        )?;
        count_to_usize(count, "tasks.active_for_sign")
    }

    fn count_assigned_since(&self, user_id: UserId, since_ms: i64) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_uuid = ?1 AND assigned_at >= ?2;",
            params![user_id.to_string(), since_ms],
            |row| row.get(0),
        )?;
        count_to_usize(count, "tasks.assigned_since")
    }

    fn delete_stale_tasks(&self, user_id: UserId, new_sign: ZodiacSign) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM tasks
             WHERE user_uuid = ?1
               AND status IN ('assigned', 'in_progress')
               AND (target_sign IS NULL OR target_sign <> ?2);",
            params![user_id.to_string(), new_sign.code()],
        )?;
        Ok(removed)
    }

    fn task_counts(&self, user_id: UserId) -> RepoResult<TaskCounts> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, status, COUNT(*) FROM tasks
             WHERE user_uuid = ?1
             GROUP BY kind, status;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut counts = TaskCounts::default();

        while let Some(row) = rows.next()? {
            let kind_text: String = row.get(0)?;
            let status_text: String = row.get(1)?;
            let count = count_to_usize(row.get(2)?, "tasks.count")?;
            let kind = parse_kind(&kind_text)?;
            let status = parse_status(&status_text)?;

            counts.total += count;
            match status {
                TaskStatus::InProgress => counts.in_progress += count,
                TaskStatus::Completed => {
                    counts.completed += count;
                    match kind {
                        TaskKind::Book => counts.completed_books += count,
                        TaskKind::Movie => counts.completed_movies += count,
                        TaskKind::Series => counts.completed_series += count,
                    }
                }
                TaskStatus::Assigned => {}
            }
        }
        Ok(counts)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let kind_text: String = row.get("kind")?;
    let status_text: String = row.get("status")?;
    let reward: i64 = row.get("experience_reward")?;

    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        user_id: parse_uuid(&user_text, "tasks.user_uuid")?,
        kind: parse_kind(&kind_text)?,
        title: row.get("title")?,
        author: row.get("author")?,
        description: row.get("description")?,
        target_sign: parse_optional_sign(row.get("target_sign")?, "tasks.target_sign")?,
        experience_reward: u32::try_from(reward).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid experience_reward `{reward}` in tasks.experience_reward"
            ))
        })?,
        status: parse_status(&status_text)?,
        assigned_at: row.get("assigned_at")?,
        completed_at: row.get("completed_at")?,
    };

    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("tasks row {}: {err}", task.id)))?;
    Ok(task)
}

fn parse_kind(value: &str) -> RepoResult<TaskKind> {
    TaskKind::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid task kind `{value}` in tasks.kind")))
}

fn parse_status(value: &str) -> RepoResult<TaskStatus> {
    TaskStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{value}` in tasks.status"))
    })
}
