//! Delivery of password-reset tokens
//!
//! Tokens never appear in responses or logs. A deployment without a mail
//! sender keeps the default notifier, which only records that a reset was
//! requested.

use axum::async_trait;
use mbxd_common::services::PasswordReset;
use mbxd_common::Result;
use tracing::warn;

#[async_trait]
pub trait ResetNotifier: Send + Sync {
    /// Hand `reset` to the owner of `email`
    async fn deliver(&self, email: &str, reset: &PasswordReset) -> Result<()>;
}

/// Used when no delivery channel is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UndeliveredResetNotifier;

#[async_trait]
impl ResetNotifier for UndeliveredResetNotifier {
    async fn deliver(&self, _email: &str, reset: &PasswordReset) -> Result<()> {
        warn!(
            "Password reset issued but no delivery channel is configured (expires {})",
            reset.expires_at
        );
        Ok(())
    }
}
