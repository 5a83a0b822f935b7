use std::sync::Arc;

use crate::db::{MediaStore, RatingStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{LeaderboardEntry, UserProfile};

/// On-demand aggregates over rating and like rows
///
/// Stateless by construction: every value is recomputed from the store on
/// each call, so nothing can go stale and nothing needs invalidating. The
/// full scan per request is the accepted cost at this system's scale.
#[derive(Clone)]
pub struct AggregationService {
    ratings: Arc<dyn RatingStore>,
    users: Arc<dyn UserStore>,
    media: Arc<dyn MediaStore>,
}

impl AggregationService {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        users: Arc<dyn UserStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            ratings,
            users,
            media,
        }
    }

    /// Mean star score over confirmed ratings; 0 when none are confirmed
    pub async fn average_score(&self, media_id: i64) -> AppResult<f64> {
        let confirmed = self.ratings.list_by_media(media_id, true).await?;
        if confirmed.is_empty() {
            return Ok(0.0);
        }
        let total: i64 = confirmed.iter().map(|r| i64::from(r.stars)).sum();
        Ok(total as f64 / confirmed.len() as f64)
    }

    /// Number of confirmed ratings for the media entry
    pub async fn rating_count(&self, media_id: i64) -> AppResult<u64> {
        let confirmed = self.ratings.list_by_media(media_id, true).await?;
        Ok(confirmed.len() as u64)
    }

    pub async fn like_count(&self, rating_id: i64) -> AppResult<u64> {
        self.ratings.count_likes(rating_id).await
    }

    /// Users ranked by total rating count, drafts included
    ///
    /// Ties break toward the lower user id so the ordering is reproducible.
    pub async fn leaderboard(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>> {
        let users = self.users.list().await?;
        let mut ranked = Vec::with_capacity(users.len());
        for user in users {
            let count = self.ratings.count_by_user(user.id).await?;
            ranked.push((user, count));
        }
        // Input is id-ordered; the stable sort preserves that for ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        Ok(ranked
            .into_iter()
            .map(|(user, count)| LeaderboardEntry {
                username: user.username,
                ratings: count,
            })
            .collect())
    }

    /// Profile statistics: rating volume, own average, most-rated genre
    pub async fn user_stats(&self, user_id: i64) -> AppResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        let history = self.ratings.list_by_user(user_id).await?;
        let average_score = if history.is_empty() {
            0.0
        } else {
            let total: i64 = history.iter().map(|r| i64::from(r.stars)).sum();
            total as f64 / history.len() as f64
        };

        // Most frequent genre across the user's rated media, ties to the
        // genre seen first in history order
        let mut tallies: Vec<(String, u64)> = Vec::new();
        for rating in &history {
            if let Some(entry) = self.media.find_by_id(rating.media_id).await? {
                for genre in entry.genres {
                    match tallies.iter_mut().find(|(g, _)| *g == genre) {
                        Some((_, count)) => *count += 1,
                        None => tallies.push((genre, 1)),
                    }
                }
            }
        }
        let mut favorite_genre = None;
        let mut best = 0;
        for (genre, count) in tallies {
            if count > best {
                best = count;
                favorite_genre = Some(genre);
            }
        }

        Ok(UserProfile {
            username: user.username,
            total_ratings: history.len() as u64,
            average_score,
            favorite_genre,
        })
    }
}
