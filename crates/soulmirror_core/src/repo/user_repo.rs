//! User repository contracts and SQLite implementation.

use crate::model::user::{User, UserId};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    total_experience,
    completed_initial_quiz
FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Users that finished the onboarding quiz, oldest account first.
    fn list_onboarded_users(&self) -> RepoResult<Vec<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, username, total_experience, completed_initial_quiz)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                experience_to_db(user.total_experience())?,
                bool_to_int(user.completed_initial_quiz),
            ],
        )?;
        Ok(user.id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                username = ?1,
                total_experience = ?2,
                completed_initial_quiz = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?4;",
            params![
                user.username.as_str(),
                experience_to_db(user.total_experience())?,
                bool_to_int(user.completed_initial_quiz),
                user.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.id));
        }
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(read_user_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let row = stmt
            .query_row([username], |row| Ok(read_user_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_onboarded_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE completed_initial_quiz = 1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(read_user_row(row)?);
        }
        Ok(users)
    }
}

fn read_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "users.uuid")?;
    let total: i64 = row.get("total_experience")?;
    let total = u64::try_from(total).map_err(|_| {
        RepoError::InvalidData(format!(
            "negative total_experience `{total}` in users.total_experience"
        ))
    })?;
    let completed = int_to_bool(
        row.get("completed_initial_quiz")?,
        "users.completed_initial_quiz",
    )?;
    let username: String = row.get("username")?;
    Ok(User::restore(id, username, total, completed))
}

fn experience_to_db(total: u64) -> RepoResult<i64> {
    i64::try_from(total)
        .map_err(|_| RepoError::InvalidData(format!("total_experience `{total}` overflows storage")))
}
