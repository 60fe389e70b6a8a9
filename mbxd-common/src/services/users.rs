//! User records
//!
//! Row mapping shared by the auth, profile and search services. Credentials
//! never leave this module except through [`Credentials`].

use crate::{uuid_utils, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "guid, username, email, public_bio, location, genres, theme_color, created_at";

/// Account holder as seen by its owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub public_bio: String,
    pub location: String,
    pub genres: Vec<String>,
    pub theme_color: String,
    pub created_at: DateTime<Utc>,
}

/// What other users may see; no e-mail, no credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicProfile {
    pub username: String,
    pub public_bio: String,
    pub genres: Vec<String>,
    pub location: String,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            public_bio: user.public_bio,
            genres: user.genres,
            location: user.location,
        }
    }
}

/// Stored credentials and lockout state
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub locked_until: Option<DateTime<Utc>>,
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    let guid: String = row.try_get("guid")?;
    let genres: String = row.try_get("genres")?;

    Ok(User {
        id: uuid_utils::parse(&guid)?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        public_bio: row.try_get("public_bio")?,
        location: row.try_get("location")?,
        // Unparseable genre lists read as empty rather than failing the profile
        genres: serde_json::from_str(&genres).unwrap_or_default(),
        theme_color: row.try_get("theme_color")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Load user by id
pub async fn load_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE guid = ?", USER_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Load user by username (case-insensitive)
pub async fn load_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
        .bind(username.trim())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Load user by e-mail (case-insensitive)
pub async fn load_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Users whose name matches a `LIKE` pattern (escaped with `\`)
pub async fn load_users_like(pool: &SqlitePool, pattern: &str, limit: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users WHERE username LIKE ? ESCAPE '\\' ORDER BY username COLLATE NOCASE LIMIT ?",
        USER_COLUMNS
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(user_from_row).collect()
}

/// Every user ordered by name; used by filtered search
pub async fn load_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users ORDER BY username COLLATE NOCASE",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(user_from_row).collect()
}

/// Credentials by username, or by e-mail when the identifier contains `@`
pub(crate) async fn load_credentials(pool: &SqlitePool, identifier: &str) -> Result<Option<Credentials>> {
    let column = if identifier.contains('@') { "email" } else { "username" };
    let row = sqlx::query(&format!(
        "SELECT guid, username, password_hash, password_salt, locked_until
         FROM users WHERE {} = ?",
        column
    ))
    .bind(identifier.trim())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid: String = row.try_get("guid")?;
            Ok(Some(Credentials {
                user_id: uuid_utils::parse(&guid)?,
                username: row.try_get("username")?,
                password_hash: row.try_get("password_hash")?,
                password_salt: row.try_get("password_salt")?,
                locked_until: row.try_get("locked_until")?,
            }))
        }
        None => Ok(None),
    }
}
