//! Profile and top chart endpoints for the logged-in user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use mbxd_common::services::{Profile, ProfileExport, ProfileUpdate, TopAlbumEntry, TopSongEntry};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::CurrentUser;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.services.profile.get_profile(current.user.id).await?))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    let profile = state
        .services
        .profile
        .update_profile(current.user.id, update)
        .await?;
    Ok(Json(profile))
}

/// GET /api/profile/export
pub async fn export_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileExport>> {
    Ok(Json(state.services.profile.export_profile(current.user.id).await?))
}

/// POST /api/profile/import
pub async fn import_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(data): ApiJson<ProfileExport>,
) -> ApiResult<Json<ProfileExport>> {
    let imported = state
        .services
        .profile
        .import_profile(current.user.id, data)
        .await?;
    Ok(Json(imported))
}

// ---- top songs ----

pub async fn get_top_songs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TopSongEntry>>> {
    Ok(Json(state.services.profile.get_top_songs(current.user.id).await?))
}

pub async fn add_top_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(entry): ApiJson<TopSongEntry>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let position = state.services.profile.add_top_song(current.user.id, entry).await?;
    Ok((StatusCode::CREATED, Json(json!({ "position": position }))))
}

pub async fn edit_top_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(index): Path<usize>,
    ApiJson(entry): ApiJson<TopSongEntry>,
) -> ApiResult<StatusCode> {
    state
        .services
        .profile
        .edit_top_song(current.user.id, index, entry)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_top_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(index): Path<usize>,
) -> ApiResult<Json<TopSongEntry>> {
    let removed = state
        .services
        .profile
        .delete_top_song(current.user.id, index)
        .await?;
    Ok(Json(removed))
}

pub async fn reorder_top_songs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<StatusCode> {
    state
        .services
        .profile
        .reorder_top_songs(current.user.id, req.from, req.to)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- top albums ----

pub async fn get_top_albums(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TopAlbumEntry>>> {
    Ok(Json(state.services.profile.get_top_albums(current.user.id).await?))
}

pub async fn add_top_album(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(entry): ApiJson<TopAlbumEntry>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let position = state.services.profile.add_top_album(current.user.id, entry).await?;
    Ok((StatusCode::CREATED, Json(json!({ "position": position }))))
}

pub async fn edit_top_album(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(index): Path<usize>,
    ApiJson(entry): ApiJson<TopAlbumEntry>,
) -> ApiResult<StatusCode> {
    state
        .services
        .profile
        .edit_top_album(current.user.id, index, entry)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_top_album(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(index): Path<usize>,
) -> ApiResult<Json<TopAlbumEntry>> {
    let removed = state
        .services
        .profile
        .delete_top_album(current.user.id, index)
        .await?;
    Ok(Json(removed))
}

pub async fn reorder_top_albums(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<StatusCode> {
    state
        .services
        .profile
        .reorder_top_albums(current.user.id, req.from, req.to)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
