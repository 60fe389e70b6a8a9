//! Session handling for the terminal shell

use async_trait::async_trait;
use mbxd_common::services::{AuthService, User};
use mbxd_common::Result;
use tokio::sync::Mutex;
use tracing::debug;

/// Login state as seen by the shell
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Log in by username or e-mail
    async fn login(&self, identifier: &str, password: &str) -> Result<User>;

    /// Register and log in the new account
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User>;

    /// The logged-in user, `None` once the session ended or expired
    async fn current_user(&self) -> Result<Option<User>>;

    async fn logout(&self) -> Result<()>;
}

/// [`AuthProvider`] backed by [`AuthService`], holding one session token
pub struct ServiceAuthProvider {
    auth: AuthService,
    token: Mutex<Option<String>>,
}

impl ServiceAuthProvider {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            token: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AuthProvider for ServiceAuthProvider {
    async fn login(&self, identifier: &str, password: &str) -> Result<User> {
        let session = self.auth.login(identifier, password).await?;
        let user = self.auth.find_user(session.user_id).await?;

        // A replaced session is ended rather than left to expire
        let previous = self.token.lock().await.replace(session.token);
        if let Some(previous) = previous {
            self.auth.logout(&previous).await?;
        }

        user.ok_or_else(|| mbxd_common::Error::not_found("User not found."))
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User> {
        let user = self
            .auth
            .sign_up_with_confirmation(username, email, password, confirm_password)
            .await?;
        self.login(&user.username, password).await
    }

    async fn current_user(&self) -> Result<Option<User>> {
        let token = self.token.lock().await.clone();
        let Some(token) = token else {
            return Ok(None);
        };

        let user = self.auth.current_user(&token).await?;
        if user.is_none() {
            debug!("Stored session is no longer valid");
            self.token.lock().await.take();
        }
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        let token = self.token.lock().await.take();
        if let Some(token) = token {
            self.auth.logout(&token).await?;
        }
        Ok(())
    }
}
