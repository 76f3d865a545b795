//! Zodiac profile repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Profiles are validated before every write and after every read.
//! - `birth_sign` is written once by `create_profile`; updates leave it alone.

use crate::model::profile::ZodiacProfile;
use crate::model::user::UserId;
use crate::repo::{
    decode_sign_map, encode_sign_map, parse_optional_sign, parse_sign, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROFILE_SELECT_SQL: &str = "SELECT
    user_uuid,
    inner_sign,
    birth_sign,
    sign_experience,
    sign_levels,
    sign_progress
FROM zodiac_profiles";

pub trait ProfileRepository {
    fn create_profile(&self, profile: &ZodiacProfile) -> RepoResult<()>;
    fn update_profile(&self, profile: &ZodiacProfile) -> RepoResult<()>;
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<ZodiacProfile>>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn create_profile(&self, profile: &ZodiacProfile) -> RepoResult<()> {
        profile.validate()?;
        self.conn.execute(
            "INSERT INTO zodiac_profiles (
                user_uuid,
                inner_sign,
                birth_sign,
                sign_experience,
                sign_levels,
                sign_progress
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                profile.user_id.to_string(),
                profile.inner_sign.code(),
                profile.birth_sign.map(|sign| sign.code()),
                encode_sign_map(&profile.sign_experience, "zodiac_profiles.sign_experience")?,
                encode_sign_map(&profile.sign_levels, "zodiac_profiles.sign_levels")?,
                encode_sign_map(&profile.sign_progress, "zodiac_profiles.sign_progress")?,
            ],
        )?;
        Ok(())
    }

    fn update_profile(&self, profile: &ZodiacProfile) -> RepoResult<()> {
        profile.validate()?;
        let changed = self.conn.execute(
            "UPDATE zodiac_profiles
             SET
                inner_sign = ?1,
                sign_experience = ?2,
                sign_levels = ?3,
                sign_progress = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_uuid = ?5;",
            params![
                profile.inner_sign.code(),
                encode_sign_map(&profile.sign_experience, "zodiac_profiles.sign_experience")?,
                encode_sign_map(&profile.sign_levels, "zodiac_profiles.sign_levels")?,
                encode_sign_map(&profile.sign_progress, "zodiac_profiles.sign_progress")?,
                profile.user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(profile.user_id));
        }
        Ok(())
    }

    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<ZodiacProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFILE_SELECT_SQL} WHERE user_uuid = ?1;"))?;
        let row = stmt
            .query_row([user_id.to_string()], |row| Ok(parse_profile_row(row)))
            .optional()?;
        row.transpose()
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<ZodiacProfile> {
    let user_text: String = row.get("user_uuid")?;
    let inner_text: String = row.get("inner_sign")?;
    let birth_text: Option<String> = row.get("birth_sign")?;
    let experience_text: String = row.get("sign_experience")?;
    let levels_text: String = row.get("sign_levels")?;
    let progress_text: String = row.get("sign_progress")?;

    let profile = ZodiacProfile {
        user_id: parse_uuid(&user_text, "zodiac_profiles.user_uuid")?,
        inner_sign: parse_sign(&inner_text, "zodiac_profiles.inner_sign")?,
        birth_sign: parse_optional_sign(birth_text, "zodiac_profiles.birth_sign")?,
        sign_experience: decode_sign_map(&experience_text, "zodiac_profiles.sign_experience")?,
        sign_levels: decode_sign_map(&levels_text, "zodiac_profiles.sign_levels")?,
        sign_progress: decode_sign_map(&progress_text, "zodiac_profiles.sign_progress")?,
    };
    profile
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("zodiac_profiles row: {err}")))?;
    Ok(profile)
}
