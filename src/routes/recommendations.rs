use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{AppState, AuthUser};
use crate::error::AppResult;
use crate::models::MediaView;
use crate::services::Strategy;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub strategy: Option<Strategy>,
}

/// Suggest unrated media for the caller
pub async fn recommend(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<MediaView>>> {
    let strategy = query.strategy.unwrap_or_default();
    let views = state.recommendations.recommend(user.id, strategy).await?;
    Ok(Json(views))
}
