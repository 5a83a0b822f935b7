use std::sync::Arc;

use crate::db::{FavoriteStore, MediaStore};
use crate::error::{AppError, AppResult};
use crate::models::MediaView;
use crate::services::aggregation::AggregationService;

/// Favorite media per user
#[derive(Clone)]
pub struct FavoritesService {
    favorites: Arc<dyn FavoriteStore>,
    media: Arc<dyn MediaStore>,
    aggregation: AggregationService,
}

impl FavoritesService {
    pub fn new(
        favorites: Arc<dyn FavoriteStore>,
        media: Arc<dyn MediaStore>,
        aggregation: AggregationService,
    ) -> Self {
        Self {
            favorites,
            media,
            aggregation,
        }
    }

    /// Idempotent: favoriting twice has no additional effect
    pub async fn add(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        self.require_media(media_id).await?;
        self.favorites.insert(user_id, media_id).await
    }

    /// Idempotent: removing a non-favorite is a no-op
    pub async fn remove(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        self.require_media(media_id).await?;
        self.favorites.delete(user_id, media_id).await
    }

    /// The user's favorites with fresh aggregates attached
    pub async fn list(&self, user_id: i64) -> AppResult<Vec<MediaView>> {
        let ids = self.favorites.list_media_ids(user_id).await?;
        let mut views = Vec::with_capacity(ids.len());
        for media_id in ids {
            if let Some(entry) = self.media.find_by_id(media_id).await? {
                let average_rating = self.aggregation.average_score(entry.id).await?;
                let rating_count = self.aggregation.rating_count(entry.id).await?;
                views.push(MediaView {
                    entry,
                    average_rating,
                    rating_count,
                });
            }
        }
        Ok(views)
    }

    async fn require_media(&self, media_id: i64) -> AppResult<()> {
        if self.media.find_by_id(media_id).await?.is_none() {
            return Err(AppError::NotFound("Media not found".to_string()));
        }
        Ok(())
    }
}
