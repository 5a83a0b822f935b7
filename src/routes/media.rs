use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::{AppState, AuthUser};
use crate::error::AppResult;
use crate::models::{MediaDraft, MediaEntry, MediaFilter, MediaView};

/// Create a media entry owned by the caller
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(draft): Json<MediaDraft>,
) -> AppResult<(StatusCode, Json<MediaEntry>)> {
    let entry = state.catalog.create(user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Filtered catalogue listing
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(filter): Query<MediaFilter>,
) -> AppResult<Json<Vec<MediaView>>> {
    let views = state.catalog.list(&filter).await?;
    Ok(Json(views))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(media_id): Path<i64>,
) -> AppResult<Json<MediaView>> {
    let view = state.catalog.get(media_id).await?;
    Ok(Json(view))
}

/// Replace an entry's content; creator only
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_id): Path<i64>,
    Json(draft): Json<MediaDraft>,
) -> AppResult<Json<MediaView>> {
    let view = state.catalog.update(media_id, user.id, draft).await?;
    Ok(Json(view))
}

/// Delete an entry; creator only
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete(media_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
