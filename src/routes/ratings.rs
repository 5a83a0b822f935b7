use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AppState, AuthUser};
use crate::error::AppResult;
use crate::models::{Rating, RatingState};

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub stars: i32,
    pub comment: Option<String>,
}

/// A rating as shown to other users, with display fields attached
#[derive(Debug, Serialize)]
pub struct RatingView {
    pub id: i64,
    pub media_id: i64,
    pub user_id: i64,
    pub username: String,
    pub stars: i32,
    pub comment: Option<String>,
    pub state: RatingState,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
}

async fn into_view(state: &AppState, rating: Rating) -> AppResult<RatingView> {
    let username = state
        .accounts
        .find(rating.user_id)
        .await?
        .map(|user| user.username)
        .unwrap_or_default();
    let like_count = state.aggregation.like_count(rating.id).await?;
    Ok(RatingView {
        id: rating.id,
        media_id: rating.media_id,
        user_id: rating.user_id,
        username,
        stars: rating.stars,
        comment: rating.comment,
        state: rating.state,
        created_at: rating.created_at,
        like_count,
    })
}

/// Submit a rating for a media entry; it starts in draft
pub async fn submit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_id): Path<i64>,
    Json(request): Json<RatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state
        .ratings
        .submit(user.id, media_id, request.stars, request.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// Confirmed ratings for a media entry, the public view
pub async fn list_for_media(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> AppResult<Json<Vec<RatingView>>> {
    let ratings = state.ratings.ratings_for_media(media_id, true).await?;
    let mut views = Vec::with_capacity(ratings.len());
    for rating in ratings {
        views.push(into_view(&state, rating).await?);
    }
    Ok(Json(views))
}

/// Edit a rating; it drops back to draft until re-confirmed
pub async fn edit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(rating_id): Path<i64>,
    Json(request): Json<RatingRequest>,
) -> AppResult<Json<Rating>> {
    let rating = state
        .ratings
        .edit(rating_id, user.id, request.stars, request.comment)
        .await?;
    Ok(Json(rating))
}

/// Confirm a rating, making it publicly visible
pub async fn confirm(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(rating_id): Path<i64>,
) -> AppResult<Json<Rating>> {
    let rating = state.ratings.confirm(rating_id, user.id).await?;
    Ok(Json(rating))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(rating_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.ratings.delete(rating_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(rating_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.ratings.like(rating_id, user.id).await?;
    Ok(StatusCode::OK)
}

pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(rating_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.ratings.unlike(rating_id, user.id).await?;
    Ok(StatusCode::OK)
}
