use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{AppState, AuthUser};
use crate::error::AppResult;
use crate::models::MediaView;

/// Add a media entry to the caller's favorites; idempotent
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.favorites.add(user.id, media_id).await?;
    Ok(StatusCode::OK)
}

/// Remove a media entry from the caller's favorites; idempotent
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.favorites.remove(user.id, media_id).await?;
    Ok(StatusCode::OK)
}

/// The caller's favorites with fresh aggregates
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<MediaView>>> {
    let views = state.favorites.list(user.id).await?;
    Ok(Json(views))
}
