//! Album catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mbxd_common::services::catalog::MSG_ALBUM_NOT_FOUND;
use mbxd_common::services::{Album, ReviewView};
use mbxd_common::uuid_utils;
use serde::Deserialize;

use crate::error::{ApiJson, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlbumSearchQuery {
    #[serde(default)]
    pub q: String,
    /// Exact title match instead of substring
    #[serde(default)]
    pub exact: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewAlbumRequest {
    pub title: String,
    pub artist_name: String,
    #[serde(default)]
    pub release_year: Option<i32>,
}

/// GET /api/albums/search?q=Rum
pub async fn search_albums(
    State(state): State<AppState>,
    Query(query): Query<AlbumSearchQuery>,
) -> ApiResult<Json<Vec<Album>>> {
    let catalog = &state.services.catalog;
    let albums = if query.exact {
        catalog.search_album(&query.q).await?
    } else {
        catalog.search_album_partial(&query.q).await?
    };
    Ok(Json(albums))
}

/// POST /api/albums
pub async fn add_album(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewAlbumRequest>,
) -> ApiResult<(StatusCode, Json<Album>)> {
    let album = state
        .services
        .catalog
        .add_album(&req.title, &req.artist_name, req.release_year)
        .await?;
    Ok((StatusCode::CREATED, Json(album)))
}

/// GET /api/albums/:id/reviews
pub async fn get_album_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ReviewView>>> {
    let album_id = uuid_utils::parse_id(&id, MSG_ALBUM_NOT_FOUND)?;
    let reviews = state.services.reviews.get_reviews_for_album(album_id).await?;
    Ok(Json(reviews))
}
