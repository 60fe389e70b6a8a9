//! Runtime settings stored in the `settings` table
//!
//! Every setting has a built-in default. Missing or NULL values are written
//! back with the default at startup, so the table always documents the
//! policy in effect.

use crate::{Error, Result};
use chrono::Duration;
use sqlx::SqlitePool;
use std::ops::RangeInclusive;
use tracing::{info, warn};

pub const SESSION_TTL_SECONDS: &str = "session_ttl_seconds";
pub const MAX_FAILED_LOGINS: &str = "max_failed_logins";
pub const LOCKOUT_SECONDS: &str = "lockout_seconds";
pub const MIN_PASSWORD_LENGTH: &str = "min_password_length";
pub const PASSWORD_RESET_TTL_SECONDS: &str = "password_reset_ttl_seconds";
pub const SEARCH_RESULT_LIMIT: &str = "search_result_limit";

const DEFAULTS: &[(&str, &str)] = &[
    (SESSION_TTL_SECONDS, "1800"),
    (MAX_FAILED_LOGINS, "5"),
    (LOCKOUT_SECONDS, "900"),
    (MIN_PASSWORD_LENGTH, "8"),
    (PASSWORD_RESET_TTL_SECONDS, "3600"),
    (SEARCH_RESULT_LIMIT, "50"),
];

/// Initialize or repair default settings
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    for (key, value) in DEFAULTS {
        ensure_setting(pool, key, value).await?;
    }
    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let value: Option<Option<String>> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match value {
        None => {
            // INSERT OR IGNORE: two processes may initialize the same database
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;
            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

/// Read a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value.flatten())
}

/// Write a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Longest duration setting accepted, ten years in seconds
const MAX_DURATION_SECONDS: i64 = 315_360_000;

const DURATION_RANGE: RangeInclusive<i64> = 1..=MAX_DURATION_SECONDS;
const FAILED_LOGIN_RANGE: RangeInclusive<i64> = 1..=100;
const PASSWORD_LENGTH_RANGE: RangeInclusive<i64> = 1..=1024;
const SEARCH_LIMIT_RANGE: RangeInclusive<i64> = 1..=1000;

fn default_value(key: &str) -> Result<i64> {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
        .ok_or_else(|| Error::Internal(format!("No default for setting '{}'", key)))
}

/// Read an integer setting, falling back to its built-in default when the
/// stored value is missing, unparsable or outside `range`
async fn load_bounded(pool: &SqlitePool, key: &str, range: RangeInclusive<i64>) -> Result<i64> {
    let default = default_value(key)?;

    if let Some(raw) = get_setting(pool, key).await? {
        match raw.trim().parse::<i64>() {
            Ok(v) if range.contains(&v) => return Ok(v),
            Ok(v) => warn!(
                "Setting '{}' value {} outside {}..={}, using default {}",
                key,
                v,
                range.start(),
                range.end(),
                default
            ),
            Err(_) => warn!("Setting '{}' has invalid value {:?}, using default {}", key, raw, default),
        }
    }
    Ok(default)
}

async fn load_duration(pool: &SqlitePool, key: &str) -> Result<Duration> {
    Ok(Duration::seconds(load_bounded(pool, key, DURATION_RANGE).await?))
}

/// Authentication policy
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub session_ttl: Duration,
    pub max_failed_logins: u32,
    pub lockout: Duration,
    pub min_password_length: usize,
    pub password_reset_ttl: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::seconds(1800),
            max_failed_logins: 5,
            lockout: Duration::seconds(900),
            min_password_length: 8,
            password_reset_ttl: Duration::seconds(3600),
        }
    }
}

impl AuthPolicy {
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        // Ranges keep the narrowing casts lossless
        let max_failed_logins = load_bounded(pool, MAX_FAILED_LOGINS, FAILED_LOGIN_RANGE).await?;
        let min_password_length = load_bounded(pool, MIN_PASSWORD_LENGTH, PASSWORD_LENGTH_RANGE).await?;

        Ok(Self {
            session_ttl: load_duration(pool, SESSION_TTL_SECONDS).await?,
            max_failed_logins: max_failed_logins as u32,
            lockout: load_duration(pool, LOCKOUT_SECONDS).await?,
            min_password_length: min_password_length as usize,
            password_reset_ttl: load_duration(pool, PASSWORD_RESET_TTL_SECONDS).await?,
        })
    }
}

/// Search policy
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    pub result_limit: i64,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self { result_limit: 50 }
    }
}

impl SearchPolicy {
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            result_limit: load_bounded(pool, SEARCH_RESULT_LIMIT, SEARCH_LIMIT_RANGE).await?,
        })
    }
}
