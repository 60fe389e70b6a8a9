//! User search endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mbxd_common::services::PublicProfile;
use mbxd_common::Error;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub genre: Option<String>,
    pub location: Option<String>,
}

/// GET /api/users/search?q=fragment
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<PublicProfile>>> {
    let results = state
        .services
        .search
        .search_by_partial_username(&query.q)
        .await?;
    Ok(Json(results))
}

/// GET /api/users/filter?genre=rock&location=Chicago
pub async fn filter_users(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<PublicProfile>>> {
    let results = state
        .services
        .search
        .search_with_filters(query.genre.as_deref(), query.location.as_deref())
        .await?;
    Ok(Json(results))
}

/// GET /api/users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicProfile>> {
    let profile = state
        .services
        .search
        .search_by_username(&username)
        .await?
        .ok_or_else(|| Error::not_found("User not found."))?;
    Ok(Json(profile))
}
