use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 hash, never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current opaque session token, rotated on login
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

/// Public profile with on-demand statistics
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    /// Ratings in any state
    pub total_ratings: u64,
    /// Mean of the user's own stars, 0 when unrated
    pub average_score: f64,
    /// Most frequent genre across the user's rated media
    pub favorite_genre: Option<String>,
}

/// One row of the rating-volume leaderboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub ratings: u64,
}
