//! Session middleware and account endpoints
//!
//! Login returns an opaque session token; protected routes expect it as
//! `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use mbxd_common::services::{Session, User};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiJson, ApiError, ApiResult};
use crate::AppState;

/// The logged-in caller, inserted by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolve the bearer token to a user or reject with 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or_else(ApiError::unauthorized)?;

    let user = match state.services.auth.current_user(&token).await? {
        Some(user) => user,
        None => {
            debug!("Rejected unknown or expired session token");
            return Err(ApiError::unauthorized());
        }
    };

    request.extensions_mut().insert(CurrentUser { user, token });
    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let auth = &state.services.auth;
    let user = match &req.confirm_password {
        Some(confirm) => {
            auth.sign_up_with_confirmation(&req.username, &req.email, &req.password, confirm)
                .await?
        }
        None => auth.sign_up(&req.username, &req.email, &req.password).await?,
    };
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or e-mail
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    let session = state.services.auth.login(&req.identifier, &req.password).await?;
    Ok(Json(session))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    state.services.auth.logout(&current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// POST /api/auth/password-reset
///
/// The token goes to the configured notifier, never back to the requester.
pub async fn send_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Json<Value>> {
    let email = req.email.trim();
    let reset = state.services.auth.send_password_reset(email).await?;
    state.reset_notifier.deliver(email, &reset).await?;

    Ok(Json(json!({
        "sent": reset.sent,
        "expires_at": reset.expires_at,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// POST /api/auth/password-reset/confirm
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetConfirmRequest>,
) -> ApiResult<StatusCode> {
    state
        .services
        .auth
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/forgot-username
pub async fn retrieve_username(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Json<Value>> {
    let username = state.services.auth.retrieve_username(&req.email).await?;
    Ok(Json(json!({ "username": username })))
}
