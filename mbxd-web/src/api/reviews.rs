//! Review endpoints; the author is always the logged-in user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use mbxd_common::services::reviews::MSG_REVIEW_NOT_FOUND;
use mbxd_common::services::{NewReview, Review, ReviewUpdate};
use mbxd_common::uuid_utils;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::auth::CurrentUser;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub album_id: Uuid,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub text: String,
}

/// POST /api/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(req): ApiJson<SubmitReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = state
        .services
        .reviews
        .submit_review(NewReview {
            user_id: current.user.id,
            album_id: req.album_id,
            rating: req.rating,
            text: req.text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/reviews/:id
pub async fn edit_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ReviewUpdate>,
) -> ApiResult<Json<Review>> {
    let review_id = uuid_utils::parse_id(&id, MSG_REVIEW_NOT_FOUND)?;
    let review = state
        .services
        .reviews
        .edit_review(current.user.id, review_id, update)
        .await?;
    Ok(Json(review))
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let review_id = uuid_utils::parse_id(&id, MSG_REVIEW_NOT_FOUND)?;
    state
        .services
        .reviews
        .delete_review(current.user.id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/reviews/:id/like
pub async fn like_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let review_id = uuid_utils::parse_id(&id, MSG_REVIEW_NOT_FOUND)?;
    let like_count = state
        .services
        .reviews
        .like_review(current.user.id, review_id)
        .await?;
    Ok(Json(json!({ "like_count": like_count })))
}

/// DELETE /api/reviews/:id/like
pub async fn unlike_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let review_id = uuid_utils::parse_id(&id, MSG_REVIEW_NOT_FOUND)?;
    let like_count = state
        .services
        .reviews
        .unlike_review(current.user.id, review_id)
        .await?;
    Ok(Json(json!({ "like_count": like_count })))
}
