use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::AppResult;
use crate::models::{LeaderboardEntry, Rating, User, UserProfile};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state
        .accounts
        .register(&request.username, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Verify credentials and hand out a fresh bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (_, token) = state
        .accounts
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(LoginResponse { token }))
}

/// Users ranked by rating volume
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let board = state.aggregation.leaderboard(limit).await?;
    Ok(Json(board))
}

/// Public profile with computed statistics
pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.aggregation.user_stats(user_id).await?;
    Ok(Json(profile))
}

/// A user's full rating history, drafts included
pub async fn rating_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Rating>>> {
    let history = state.ratings.history(user_id).await?;
    Ok(Json(history))
}
