//! Account creation, login sessions, lockout and password recovery

use crate::db::settings::AuthPolicy;
use crate::services::password::{generate_salt, hash_password, verify_password};
use crate::services::users::{self, User};
use crate::services::is_unique_violation;
use crate::validation::{is_blank, is_strong_password, is_valid_email};
use crate::{uuid_utils, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const MSG_MISSING_CREDENTIALS: &str = "Please enter username and password.";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address.";
pub const MSG_WEAK_PASSWORD: &str = "Password must meet strength requirements.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const MSG_USERNAME_TAKEN: &str = "Username already exists.";
pub const MSG_EMAIL_TAKEN: &str = "Email already registered.";
pub const MSG_USER_NOT_FOUND: &str = "User not found.";
pub const MSG_INCORRECT_PASSWORD: &str = "Incorrect password.";
pub const MSG_ACCOUNT_LOCKED: &str = "Account locked. Try again later.";
pub const MSG_UNKNOWN_EMAIL: &str = "No account associated with this email.";
pub const MSG_INVALID_RESET_TOKEN: &str = "Invalid or expired reset token.";

/// Live login session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of a session check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStatus {
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Issued password-reset token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub sent: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(pool: SqlitePool, policy: AuthPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    /// Create an account
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let email = email.trim();

        if is_blank(username) || is_blank(email) || password.is_empty() {
            return Err(Error::validation(MSG_MISSING_CREDENTIALS));
        }
        if !is_valid_email(email) {
            return Err(Error::validation(MSG_INVALID_EMAIL));
        }
        if !is_strong_password(password, self.policy.min_password_length) {
            return Err(Error::validation(MSG_WEAK_PASSWORD));
        }

        if users::load_user_by_username(&self.pool, username).await?.is_some() {
            debug!("Sign-up rejected, username taken: {}", username);
            return Err(Error::conflict(MSG_USERNAME_TAKEN));
        }
        if users::load_user_by_email(&self.pool, email).await?.is_some() {
            debug!("Sign-up rejected, email taken: {}", email);
            return Err(Error::conflict(MSG_EMAIL_TAKEN));
        }

        let id = uuid_utils::generate();
        let salt = generate_salt();
        let hash = hash_password(password, &salt);
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (guid, username, email, password_hash, password_salt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(username)
        .bind(email)
        .bind(&hash)
        .bind(&salt)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent sign-up
            if is_unique_violation(&e) {
                Error::conflict(MSG_USERNAME_TAKEN)
            } else {
                Error::Database(e)
            }
        })?;

        info!("Created account '{}'", username);

        users::load_user(&self.pool, id)
            .await?
            .ok_or_else(|| Error::Internal(format!("User {} vanished after insert", id)))
    }

    /// Create an account after checking the confirmation field
    pub async fn sign_up_with_confirmation(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User> {
        if password != confirm_password {
            return Err(Error::validation(MSG_PASSWORD_MISMATCH));
        }
        self.sign_up(username, email, password).await
    }

    /// Log in by username, or by e-mail when the identifier contains `@`
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session> {
        if is_blank(identifier) || password.is_empty() {
            return Err(Error::validation(MSG_MISSING_CREDENTIALS));
        }

        let creds = users::load_credentials(&self.pool, identifier)
            .await?
            .ok_or_else(|| Error::Authentication(MSG_USER_NOT_FOUND.to_string()))?;

        let now = Utc::now();
        if let Some(until) = creds.locked_until {
            if until > now {
                warn!("Login attempt on locked account '{}'", creds.username);
                return Err(Error::Authentication(MSG_ACCOUNT_LOCKED.to_string()));
            }
        }

        if !verify_password(password, &creds.password_salt, &creds.password_hash) {
            self.record_failed_login(creds.user_id, now).await?;
            debug!("Incorrect password for '{}'", creds.username);
            return Err(Error::Authentication(MSG_INCORRECT_PASSWORD.to_string()));
        }

        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, updated_at = ? WHERE guid = ?",
        )
        .bind(now)
        .bind(creds.user_id.to_string())
        .execute(&self.pool)
        .await?;

        self.purge_expired(now).await?;

        let session = Session {
            token: uuid_utils::generate().to_string(),
            user_id: creds.user_id,
            username: creds.username,
            created_at: now,
            expires_at: now + self.policy.session_ttl,
        };

        sqlx::query("INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&session.token)
            .bind(session.user_id.to_string())
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;

        info!("User '{}' logged in", session.username);
        Ok(session)
    }

    /// Count a failed attempt; locks the account once the limit is reached
    ///
    /// The counter is bumped in a single statement so concurrent failures
    /// each see a distinct count.
    async fn record_failed_login(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let attempts: i64 = sqlx::query_scalar(
            "UPDATE users SET failed_login_attempts = failed_login_attempts + 1, updated_at = ? \
             WHERE guid = ? RETURNING failed_login_attempts",
        )
        .bind(now)
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        if attempts >= i64::from(self.policy.max_failed_logins) {
            let until = now + self.policy.lockout;
            sqlx::query(
                "UPDATE users SET failed_login_attempts = 0, locked_until = ?, updated_at = ? WHERE guid = ?",
            )
            .bind(until)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
            warn!("Account {} locked until {} after {} failed logins", user_id, until, attempts);
        }
        Ok(())
    }

    /// Whether the user currently holds an unexpired session
    pub async fn check_session(&self, username: &str) -> Result<SessionStatus> {
        let user = users::load_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_NOT_FOUND))?;

        let expiries: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT expires_at FROM sessions WHERE user_guid = ?")
                .bind(user.id.to_string())
                .fetch_all(&self.pool)
                .await?;

        let now = Utc::now();
        let latest = expiries.into_iter().filter(|e| *e > now).max();

        Ok(SessionStatus {
            active: latest.is_some(),
            expires_at: latest,
        })
    }

    /// Resolve a session token to its user; expired tokens are removed
    pub async fn current_user(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT user_guid, expires_at FROM sessions WHERE token = ?")
            .bind(token.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
        if expires_at <= Utc::now() {
            self.logout(token).await?;
            debug!("Session expired at {}", expires_at);
            return Ok(None);
        }

        let guid: String = row.try_get("user_guid")?;
        users::load_user(&self.pool, uuid_utils::parse(&guid)?).await
    }

    /// End a session (idempotent)
    pub async fn logout(&self, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Session ended");
        }
        Ok(())
    }

    /// Drop expired sessions and spent or expired reset tokens
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<()> {
        let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        let resets = sqlx::query("DELETE FROM password_resets WHERE used = 1 OR expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        if sessions.rows_affected() + resets.rows_affected() > 0 {
            debug!(
                "Purged {} sessions and {} reset tokens",
                sessions.rows_affected(),
                resets.rows_affected()
            );
        }
        Ok(())
    }

    /// Issue a password-reset token
    ///
    /// Delivery is out of band; the token is returned to the caller.
    pub async fn send_password_reset(&self, email: &str) -> Result<PasswordReset> {
        let user = users::load_user_by_email(&self.pool, email)
            .await?
            .ok_or_else(|| Error::not_found(MSG_UNKNOWN_EMAIL))?;

        let now = Utc::now();
        self.purge_expired(now).await?;

        let reset = PasswordReset {
            sent: true,
            token: uuid_utils::generate().to_string(),
            expires_at: now + self.policy.password_reset_ttl,
        };

        sqlx::query(
            "INSERT INTO password_resets (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&reset.token)
        .bind(user.id.to_string())
        .bind(now)
        .bind(reset.expires_at)
        .execute(&self.pool)
        .await?;

        info!("Password reset issued for '{}'", user.username);
        Ok(reset)
    }

    /// Set a new password using a reset token
    ///
    /// Clears any lockout and ends every open session of the user.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let row = sqlx::query("SELECT user_guid, expires_at, used FROM password_resets WHERE token = ?")
            .bind(token.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Authentication(MSG_INVALID_RESET_TOKEN.to_string()))?;

        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
        let used: bool = row.try_get("used")?;
        if used || expires_at <= Utc::now() {
            return Err(Error::Authentication(MSG_INVALID_RESET_TOKEN.to_string()));
        }

        if !is_strong_password(new_password, self.policy.min_password_length) {
            return Err(Error::validation(MSG_WEAK_PASSWORD));
        }

        let user_guid: String = row.try_get("user_guid")?;
        let salt = generate_salt();
        let hash = hash_password(new_password, &salt);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, password_salt = ?, failed_login_attempts = 0,
                locked_until = NULL, updated_at = ?
            WHERE guid = ?
            "#,
        )
        .bind(&hash)
        .bind(&salt)
        .bind(now)
        .bind(&user_guid)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE password_resets SET used = 1 WHERE token = ?")
            .bind(token.trim())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_guid = ?")
            .bind(&user_guid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Password reset completed for {}", user_guid);
        Ok(())
    }

    /// Forgotten-username lookup
    pub async fn retrieve_username(&self, email: &str) -> Result<String> {
        users::load_user_by_email(&self.pool, email)
            .await?
            .map(|u| u.username)
            .ok_or_else(|| Error::not_found(MSG_UNKNOWN_EMAIL))
    }

    pub async fn is_account_locked(&self, username: &str) -> Result<bool> {
        let creds = users::load_credentials(&self.pool, username)
            .await?
            .ok_or_else(|| Error::not_found(MSG_USER_NOT_FOUND))?;

        Ok(creds.locked_until.map_or(false, |until| until > Utc::now()))
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        users::load_user(&self.pool, id).await
    }
}
