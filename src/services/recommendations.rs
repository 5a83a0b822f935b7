use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::db::{MediaStore, RatingStore};
use crate::error::AppResult;
use crate::models::{MediaFilter, MediaView, Rating};
use crate::services::aggregation::AggregationService;

/// Recommendation responses are capped to this many entries
const MAX_RECOMMENDATIONS: usize = 5;
/// Ratings at or above this score feed the genre taste signal
const GENRE_SIGNAL_THRESHOLD: i32 = 4;

/// Caller-selected recommendation strategy
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Suggest unrated media sharing the user's highest-tallied genre
    /// among highly scored ratings
    #[default]
    Genre,
    /// Suggest unrated media of the user's most-rated content type
    Content,
}

/// Suggests unseen media from a user's rating history
///
/// Purely read-side: the taste signal is inferred per request from the full
/// history (drafts included - the signal reflects every opinion the user has
/// formed, not only the public ones) and nothing is persisted. Absence of a
/// signal or of candidates yields an empty list, never an error.
#[derive(Clone)]
pub struct RecommendationService {
    ratings: Arc<dyn RatingStore>,
    media: Arc<dyn MediaStore>,
    aggregation: AggregationService,
}

impl RecommendationService {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        media: Arc<dyn MediaStore>,
        aggregation: AggregationService,
    ) -> Self {
        Self {
            ratings,
            media,
            aggregation,
        }
    }

    pub async fn recommend(&self, user_id: i64, strategy: Strategy) -> AppResult<Vec<MediaView>> {
        let history = self.ratings.list_by_user(user_id).await?;
        let rated: HashSet<i64> = history.iter().map(|r| r.media_id).collect();

        let candidates = match strategy {
            Strategy::Genre => {
                let Some(genre) = self.favorite_genre(&history).await? else {
                    return Ok(Vec::new());
                };
                tracing::debug!(user_id, genre = %genre, "genre taste signal inferred");
                self.media
                    .list(&MediaFilter {
                        genre: Some(genre),
                        ..MediaFilter::default()
                    })
                    .await?
            }
            Strategy::Content => {
                let Some(media_type) = self.favorite_media_type(&history).await? else {
                    return Ok(Vec::new());
                };
                tracing::debug!(user_id, media_type = %media_type, "content taste signal inferred");
                self.media
                    .list(&MediaFilter {
                        media_type: Some(media_type),
                        ..MediaFilter::default()
                    })
                    .await?
            }
        };

        // Anything the user already rated is excluded, drafts included
        let mut views = Vec::new();
        for entry in candidates.into_iter().filter(|m| !rated.contains(&m.id)) {
            let average_rating = self.aggregation.average_score(entry.id).await?;
            let rating_count = self.aggregation.rating_count(entry.id).await?;
            views.push(MediaView {
                entry,
                average_rating,
                rating_count,
            });
        }

        // Best average first; equal averages fall back to id order
        views.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        views.truncate(MAX_RECOMMENDATIONS);
        Ok(views)
    }

    /// Top-tallied genre among ratings scored at or above the threshold;
    /// ties go to the genre encountered first in history order
    async fn favorite_genre(&self, history: &[Rating]) -> AppResult<Option<String>> {
        let mut tallies: Vec<(String, u64)> = Vec::new();
        for rating in history.iter().filter(|r| r.stars >= GENRE_SIGNAL_THRESHOLD) {
            if let Some(entry) = self.media.find_by_id(rating.media_id).await? {
                for genre in entry.genres {
                    bump(&mut tallies, genre);
                }
            }
        }
        Ok(first_max(tallies))
    }

    /// Most-rated content type over the whole history, no score threshold
    async fn favorite_media_type(&self, history: &[Rating]) -> AppResult<Option<String>> {
        let mut tallies: Vec<(String, u64)> = Vec::new();
        for rating in history {
            if let Some(entry) = self.media.find_by_id(rating.media_id).await? {
                bump(&mut tallies, entry.media_type);
            }
        }
        Ok(first_max(tallies))
    }
}

fn bump(tallies: &mut Vec<(String, u64)>, key: String) {
    match tallies.iter_mut().find(|(k, _)| *k == key) {
        Some((_, count)) => *count += 1,
        None => tallies.push((key, 1)),
    }
}

/// First entry holding the maximum tally, preserving insertion order on ties
fn first_max(tallies: Vec<(String, u64)>) -> Option<String> {
    let mut winner = None;
    let mut best = 0;
    for (key, count) in tallies {
        if count > best {
            best = count;
            winner = Some(key);
        }
    }
    winner
}
