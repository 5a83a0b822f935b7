use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod favorites;
pub mod media;
pub mod ratings;
pub mod recommendations;
pub mod users;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/leaderboard", get(users::leaderboard))
        .route("/users/:id/profile", get(users::profile))
        .route("/users/:id/ratings", get(users::rating_history))
        // Media catalogue
        .route("/media", post(media::create).get(media::list))
        .route(
            "/media/:id",
            get(media::get).put(media::update).delete(media::remove),
        )
        // Ratings
        .route(
            "/media/:id/ratings",
            get(ratings::list_for_media).post(ratings::submit),
        )
        .route("/ratings/:id", put(ratings::edit).delete(ratings::remove))
        .route("/ratings/:id/confirm", post(ratings::confirm))
        .route(
            "/ratings/:id/like",
            post(ratings::like).delete(ratings::unlike),
        )
        // Favorites
        .route(
            "/media/:id/favorite",
            post(favorites::add).delete(favorites::remove),
        )
        .route("/favorites", get(favorites::list))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
