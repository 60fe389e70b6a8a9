//! Common error types for Musicboxd
//!
//! User-facing variants display exactly the message shown to the user, so
//! callers (terminal shell, HTTP handlers) can print `err.to_string()`.

use thiserror::Error;
use tracing::error;

/// Common result type for Musicboxd operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Musicboxd services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("{0}")]
    Validation(String),

    /// Login / session failure
    #[error("{0}")]
    Authentication(String),

    /// Caller does not own the resource
    #[error("Access denied.")]
    AccessDenied,

    /// Requested resource not found
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// Bounded collection is full
    #[error("{0}")]
    LimitExceeded(String),

    /// Storage failed while performing a user operation
    #[error("{0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    /// Replace a storage failure with the operation's user-facing message.
    ///
    /// Domain errors (validation, conflicts, ...) pass through unchanged.
    pub fn or_unavailable(self, message: &str) -> Self {
        match self {
            Error::Database(e) => {
                error!("{}: {}", message, e);
                Error::Unavailable(message.to_string())
            }
            Error::Io(e) => {
                error!("{}: {}", message, e);
                Error::Unavailable(message.to_string())
            }
            other => other,
        }
    }

    /// True for errors caused by the caller rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::Authentication(_)
                | Error::AccessDenied
                | Error::NotFound(_)
                | Error::Conflict(_)
                | Error::LimitExceeded(_)
        )
    }
}
