use std::cmp::Ordering;
use std::sync::Arc;

use crate::db::MediaStore;
use crate::error::{AppError, AppResult};
use crate::models::{MediaDraft, MediaEntry, MediaFilter, MediaSort, MediaView};
use crate::services::aggregation::AggregationService;

const MIN_RELEASE_YEAR: i32 = 1900;
const MAX_RELEASE_YEAR: i32 = 2100;

/// Media catalogue CRUD and filtered listings
///
/// Scalar filtering happens in the store; predicates and orderings that
/// depend on derived aggregates (minimum average score, score sort) are
/// applied here on top of freshly computed values.
#[derive(Clone)]
pub struct CatalogService {
    media: Arc<dyn MediaStore>,
    aggregation: AggregationService,
}

impl CatalogService {
    pub fn new(media: Arc<dyn MediaStore>, aggregation: AggregationService) -> Self {
        Self { media, aggregation }
    }

    pub async fn create(&self, creator_id: i64, draft: MediaDraft) -> AppResult<MediaEntry> {
        validate_draft(&draft)?;
        let entry = self.media.insert(draft, creator_id).await?;
        tracing::info!(media_id = entry.id, creator_id, "media created");
        Ok(entry)
    }

    pub async fn get(&self, media_id: i64) -> AppResult<MediaView> {
        let entry = self.require(media_id).await?;
        self.view(entry).await
    }

    /// Only the creator may edit an entry
    pub async fn update(
        &self,
        media_id: i64,
        requester_id: i64,
        draft: MediaDraft,
    ) -> AppResult<MediaView> {
        validate_draft(&draft)?;
        self.require_owned(media_id, requester_id, "Only creator can edit")
            .await?;
        self.media.update(media_id, draft).await?;
        self.get(media_id).await
    }

    /// Only the creator may delete an entry; its ratings and favorites
    /// cascade away with it
    pub async fn delete(&self, media_id: i64, requester_id: i64) -> AppResult<()> {
        self.require_owned(media_id, requester_id, "Only creator can delete")
            .await?;
        self.media.delete(media_id).await?;
        tracing::info!(media_id, user_id = requester_id, "media deleted");
        Ok(())
    }

    pub async fn list(&self, filter: &MediaFilter) -> AppResult<Vec<MediaView>> {
        let entries = self.media.list(filter).await?;
        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            views.push(self.view(entry).await?);
        }

        if let Some(min_rating) = filter.min_rating {
            views.retain(|v| v.average_rating >= min_rating);
        }

        match filter.sort_by {
            Some(MediaSort::Title) => views.sort_by(|a, b| a.entry.title.cmp(&b.entry.title)),
            Some(MediaSort::Year) => views.sort_by_key(|v| v.entry.release_year),
            Some(MediaSort::Score) => views.sort_by(|a, b| {
                b.average_rating
                    .partial_cmp(&a.average_rating)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.entry.id.cmp(&b.entry.id))
            }),
            None => {}
        }
        Ok(views)
    }

    async fn view(&self, entry: MediaEntry) -> AppResult<MediaView> {
        let average_rating = self.aggregation.average_score(entry.id).await?;
        let rating_count = self.aggregation.rating_count(entry.id).await?;
        Ok(MediaView {
            entry,
            average_rating,
            rating_count,
        })
    }

    async fn require(&self, media_id: i64) -> AppResult<MediaEntry> {
        self.media
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {media_id} not found")))
    }

    async fn require_owned(
        &self,
        media_id: i64,
        requester_id: i64,
        denial: &str,
    ) -> AppResult<MediaEntry> {
        let entry = self.require(media_id).await?;
        if entry.creator_id != requester_id {
            return Err(AppError::Forbidden(denial.to_string()));
        }
        Ok(entry)
    }
}

fn validate_draft(draft: &MediaDraft) -> AppResult<()> {
    if draft.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&draft.release_year) {
        return Err(AppError::InvalidInput("Invalid release year".to_string()));
    }
    Ok(())
}
