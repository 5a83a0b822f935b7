use axum_test::TestServer;
use serde_json::json;

use media_ratings_api::api::AppState;
use media_ratings_api::routes::create_router;

fn create_test_server() -> TestServer {
    let state = AppState::in_memory();
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Registers a user and returns a bearer token
async fn register_and_login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/users/register")
        .json(&json!({ "username": username, "password": "pass" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/users/login")
        .json(&json!({ "username": username, "password": "pass" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

async fn create_media(server: &TestServer, token: &str, body: serde_json::Value) -> i64 {
    let response = server
        .post("/api/media")
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    created["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_login_and_duplicate_username() {
    let server = create_test_server();

    let token = register_and_login(&server, "alice").await;
    assert!(!token.is_empty());

    // Same username again conflicts
    let response = server
        .post("/api/users/register")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);

    // Wrong password is rejected
    let response = server
        .post("/api/users/login")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let server = create_test_server();

    let response = server
        .post("/api/media")
        .json(&json!({ "title": "T", "release_year": 2000 }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/recommendations")
        .authorization_bearer("not-a-real-token")
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_media_validation() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;

    let response = server
        .post("/api/media")
        .authorization_bearer(&token)
        .json(&json!({ "title": "   ", "release_year": 2000 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/media")
        .authorization_bearer(&token)
        .json(&json!({ "title": "T", "release_year": 1800 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_creator_can_mutate_media() {
    let server = create_test_server();
    let creator = register_and_login(&server, "creator").await;
    let other = register_and_login(&server, "other").await;

    let media_id = create_media(
        &server,
        &creator,
        json!({ "title": "Mine", "release_year": 2020 }),
    )
    .await;

    let response = server
        .put(&format!("/api/media/{media_id}"))
        .authorization_bearer(&other)
        .json(&json!({ "title": "Stolen", "release_year": 2020 }))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/media/{media_id}"))
        .authorization_bearer(&creator)
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_rating_lifecycle_end_to_end() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;
    let media_id = create_media(
        &server,
        &token,
        json!({ "title": "M", "release_year": 2020 }),
    )
    .await;

    // Submit: starts in draft even with a comment
    let response = server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 5, "comment": "great" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let rating: serde_json::Value = response.json();
    assert_eq!(rating["state"], "draft");
    let rating_id = rating["id"].as_i64().unwrap();

    // Absent from the public view while in draft
    let response = server.get(&format!("/api/media/{media_id}/ratings")).await;
    response.assert_status_ok();
    let public: Vec<serde_json::Value> = response.json();
    assert!(public.is_empty());

    // Confirm: now public, average reflects it
    let response = server
        .post(&format!("/api/ratings/{rating_id}/confirm"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let response = server.get(&format!("/api/media/{media_id}/ratings")).await;
    let public: Vec<serde_json::Value> = response.json();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["username"], "alice");

    let response = server
        .get(&format!("/api/media/{media_id}"))
        .authorization_bearer(&token)
        .await;
    let view: serde_json::Value = response.json();
    assert_eq!(view["average_rating"], 5.0);

    // Edit: back to draft, average drops to zero until re-confirmed
    let response = server
        .put(&format!("/api/ratings/{rating_id}"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 3 }))
        .await;
    response.assert_status_ok();
    let edited: serde_json::Value = response.json();
    assert_eq!(edited["state"], "draft");

    let response = server
        .get(&format!("/api/media/{media_id}"))
        .authorization_bearer(&token)
        .await;
    let view: serde_json::Value = response.json();
    assert_eq!(view["average_rating"], 0.0);

    // Still visible in the owner's history
    let response = server.get("/api/users/1/ratings").await;
    let history: Vec<serde_json::Value> = response.json();
    assert_eq!(history.len(), 1);

    // Re-confirm
    let response = server
        .post(&format!("/api/ratings/{rating_id}/confirm"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/media/{media_id}"))
        .authorization_bearer(&token)
        .await;
    let view: serde_json::Value = response.json();
    assert_eq!(view["average_rating"], 3.0);
}

#[tokio::test]
async fn test_average_over_two_confirmed_ratings() {
    let server = create_test_server();
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;
    let media_id = create_media(
        &server,
        &alice,
        json!({ "title": "M", "release_year": 2020 }),
    )
    .await;

    for (token, stars) in [(&alice, 5), (&bob, 3)] {
        let response = server
            .post(&format!("/api/media/{media_id}/ratings"))
            .authorization_bearer(token)
            .json(&json!({ "stars": stars }))
            .await;
        let rating: serde_json::Value = response.json();
        let rating_id = rating["id"].as_i64().unwrap();
        server
            .post(&format!("/api/ratings/{rating_id}/confirm"))
            .authorization_bearer(token)
            .await
            .assert_status_ok();
    }

    let response = server
        .get(&format!("/api/media/{media_id}"))
        .authorization_bearer(&alice)
        .await;
    let view: serde_json::Value = response.json();
    assert_eq!(view["average_rating"], 4.0);
    assert_eq!(view["rating_count"], 2);
}

#[tokio::test]
async fn test_duplicate_rating_and_invalid_stars() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;
    let media_id = create_media(
        &server,
        &token,
        json!({ "title": "M", "release_year": 2020 }),
    )
    .await;

    let response = server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 6 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 4 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 1 }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_only_owner_edits_ratings() {
    let server = create_test_server();
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;
    let media_id = create_media(
        &server,
        &alice,
        json!({ "title": "M", "release_year": 2020 }),
    )
    .await;

    let response = server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&alice)
        .json(&json!({ "stars": 5 }))
        .await;
    let rating: serde_json::Value = response.json();
    let rating_id = rating["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/ratings/{rating_id}"))
        .authorization_bearer(&bob)
        .json(&json!({ "stars": 1 }))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    let response = server
        .delete("/api/ratings/999")
        .authorization_bearer(&bob)
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_counts_are_idempotent() {
    let server = create_test_server();
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;
    let media_id = create_media(
        &server,
        &alice,
        json!({ "title": "M", "release_year": 2020 }),
    )
    .await;

    let response = server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&alice)
        .json(&json!({ "stars": 5 }))
        .await;
    let rating: serde_json::Value = response.json();
    let rating_id = rating["id"].as_i64().unwrap();
    server
        .post(&format!("/api/ratings/{rating_id}/confirm"))
        .authorization_bearer(&alice)
        .await
        .assert_status_ok();

    // Like twice; count stays at one
    for _ in 0..2 {
        server
            .post(&format!("/api/ratings/{rating_id}/like"))
            .authorization_bearer(&bob)
            .await
            .assert_status_ok();
    }
    let response = server.get(&format!("/api/media/{media_id}/ratings")).await;
    let public: Vec<serde_json::Value> = response.json();
    assert_eq!(public[0]["like_count"], 1);

    // Unlike twice; count settles at zero without an error
    for _ in 0..2 {
        server
            .delete(&format!("/api/ratings/{rating_id}/like"))
            .authorization_bearer(&bob)
            .await
            .assert_status_ok();
    }
    let response = server.get(&format!("/api/media/{media_id}/ratings")).await;
    let public: Vec<serde_json::Value> = response.json();
    assert_eq!(public[0]["like_count"], 0);

    // Liking a nonexistent rating is a 404
    let response = server
        .post("/api/ratings/999/like")
        .authorization_bearer(&bob)
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_round_trip() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;
    let media_id = create_media(
        &server,
        &token,
        json!({ "title": "Fav", "release_year": 2020 }),
    )
    .await;

    let response = server
        .post("/api/media/999/favorite")
        .authorization_bearer(&token)
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    for _ in 0..2 {
        server
            .post(&format!("/api/media/{media_id}/favorite"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    let response = server
        .get("/api/favorites")
        .authorization_bearer(&token)
        .await;
    let favorites: Vec<serde_json::Value> = response.json();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["title"], "Fav");

    server
        .delete(&format!("/api/media/{media_id}/favorite"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .get("/api/favorites")
        .authorization_bearer(&token)
        .await;
    let favorites: Vec<serde_json::Value> = response.json();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_recommendations_by_genre_and_content() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;

    let rated = create_media(
        &server,
        &token,
        json!({ "title": "Seed", "media_type": "Movie", "release_year": 2020, "genres": ["Action"] }),
    )
    .await;
    create_media(
        &server,
        &token,
        json!({ "title": "Target", "media_type": "Movie", "release_year": 2021, "genres": ["Action"] }),
    )
    .await;
    create_media(
        &server,
        &token,
        json!({ "title": "OffGenre", "media_type": "Series", "release_year": 2021, "genres": ["Comedy"] }),
    )
    .await;

    // No history yet: both strategies fail softly with an empty list
    let response = server
        .get("/api/recommendations")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert!(recs.is_empty());

    server
        .post(&format!("/api/media/{rated}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 5 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    // Genre strategy is the default
    let response = server
        .get("/api/recommendations")
        .authorization_bearer(&token)
        .await;
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["title"], "Target");

    let response = server
        .get("/api/recommendations")
        .add_query_param("strategy", "content")
        .authorization_bearer(&token)
        .await;
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["title"], "Target");
}

#[tokio::test]
async fn test_leaderboard_ranks_and_limits() {
    let server = create_test_server();
    let winner = register_and_login(&server, "winner").await;
    let loser = register_and_login(&server, "loser").await;

    let m1 = create_media(
        &server,
        &winner,
        json!({ "title": "A", "release_year": 2020 }),
    )
    .await;
    let m2 = create_media(
        &server,
        &winner,
        json!({ "title": "B", "release_year": 2020 }),
    )
    .await;

    for media_id in [m1, m2] {
        server
            .post(&format!("/api/media/{media_id}/ratings"))
            .authorization_bearer(&winner)
            .json(&json!({ "stars": 4 }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
    server
        .post(&format!("/api/media/{m1}/ratings"))
        .authorization_bearer(&loser)
        .json(&json!({ "stars": 2 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .get("/api/users/leaderboard")
        .add_query_param("limit", 1)
        .await;
    response.assert_status_ok();
    let board: Vec<serde_json::Value> = response.json();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["username"], "winner");
    assert_eq!(board[0]["ratings"], 2);
}

#[tokio::test]
async fn test_profile_stats() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice").await;
    let media_id = create_media(
        &server,
        &token,
        json!({ "title": "M", "media_type": "Movie", "release_year": 2020, "genres": ["Horror"] }),
    )
    .await;
    server
        .post(&format!("/api/media/{media_id}/ratings"))
        .authorization_bearer(&token)
        .json(&json!({ "stars": 4 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server.get("/api/users/1/profile").await;
    response.assert_status_ok();
    let profile: serde_json::Value = response.json();
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["total_ratings"], 1);
    assert_eq!(profile["average_score"], 4.0);
    assert_eq!(profile["favorite_genre"], "Horror");

    let response = server.get("/api/users/999/profile").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
