//! Album list endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use mbxd_common::services::{AlbumList, AlbumListEntry, ListUpdate, ListView};
use serde::Deserialize;

use super::auth::CurrentUser;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddAlbumRequest {
    pub album_title: String,
}

/// GET /api/lists
pub async fn get_user_lists(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<AlbumList>>> {
    Ok(Json(state.services.lists.get_user_lists(current.user.id).await?))
}

/// POST /api/lists/:name/albums
pub async fn add_album_to_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(name): Path<String>,
    ApiJson(req): ApiJson<AddAlbumRequest>,
) -> ApiResult<(StatusCode, Json<AlbumListEntry>)> {
    let entry = state
        .services
        .lists
        .add_album_to_list(current.user.id, &name, &req.album_title)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/lists/:name/albums/:title
pub async fn remove_album_from_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((name, title)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .services
        .lists
        .remove_album_from_list(current.user.id, &name, &title)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/lists/:name
pub async fn update_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(name): Path<String>,
    ApiJson(update): ApiJson<ListUpdate>,
) -> ApiResult<Json<AlbumList>> {
    let list = state
        .services
        .lists
        .update_list(current.user.id, &name, update)
        .await?;
    Ok(Json(list))
}

/// DELETE /api/lists/:name
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.services.lists.delete_list(current.user.id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:username/lists/:name
pub async fn view_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((username, name)): Path<(String, String)>,
) -> ApiResult<Json<ListView>> {
    let view = state
        .services
        .lists
        .view_list(Some(current.user.id), &username, &name)
        .await?;
    Ok(Json(view))
}
