//! HTTP mapping of service errors

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mbxd_common::Error;
use serde_json::json;
use tracing::{debug, error};

/// Service error rendered as `{"error": {"code", "message"}}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError(Error::Authentication("Please log in.".to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::Authentication(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::AccessDenied => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Error::LimitExceeded(_) => (StatusCode::CONFLICT, "LIMIT_EXCEEDED"),
            Error::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UNAVAILABLE"),
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        // Raw storage errors are logged, not sent to clients
        let message = if error_code == "INTERNAL_ERROR" {
            error!("Request failed: {}", self.0);
            "Internal server error.".to_string()
        } else {
            if self.0.is_user_error() {
                debug!("Request rejected: {}", self.0);
            }
            self.0.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the API error envelope
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(Error::Validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))),
        }
    }
}
