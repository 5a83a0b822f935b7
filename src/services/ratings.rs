use std::sync::Arc;

use crate::db::{MediaStore, RatingStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewRating, Rating};
use crate::services::moderation::ModerationPolicy;

const MIN_STARS: i32 = 1;
const MAX_STARS: i32 = 5;

/// Rating lifecycle orchestration
///
/// Validates submissions, enforces ownership, and applies the moderation
/// policy before anything reaches the store. The store itself arbitrates the
/// one-rating-per-(user, media) constraint.
#[derive(Clone)]
pub struct RatingService {
    ratings: Arc<dyn RatingStore>,
    media: Arc<dyn MediaStore>,
    policy: ModerationPolicy,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingStore>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            ratings,
            media,
            policy: ModerationPolicy::new(),
        }
    }

    /// Submits a new rating; it starts in draft regardless of the comment
    pub async fn submit(
        &self,
        user_id: i64,
        media_id: i64,
        stars: i32,
        comment: Option<String>,
    ) -> AppResult<Rating> {
        validate_stars(stars)?;
        if self.media.find_by_id(media_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Media {media_id} not found")));
        }

        let rating = self
            .ratings
            .insert(NewRating {
                media_id,
                user_id,
                stars,
                comment,
                state: self.policy.on_submit(),
            })
            .await?;

        tracing::info!(rating_id = rating.id, user_id, media_id, "rating submitted");
        Ok(rating)
    }

    /// Rewrites score and comment; any prior confirmation is discarded
    pub async fn edit(
        &self,
        rating_id: i64,
        requester_id: i64,
        stars: i32,
        comment: Option<String>,
    ) -> AppResult<Rating> {
        validate_stars(stars)?;
        let existing = self.owned_rating(rating_id, requester_id).await?;

        let state = self.policy.on_edit(existing.state);
        self.ratings
            .update_content(rating_id, stars, comment.clone(), state)
            .await?;

        tracing::info!(rating_id, user_id = requester_id, "rating edited, back to draft");
        Ok(Rating {
            stars,
            comment,
            state,
            ..existing
        })
    }

    /// Marks the rating publicly visible; confirming twice is a no-op success
    pub async fn confirm(&self, rating_id: i64, requester_id: i64) -> AppResult<Rating> {
        let existing = self.owned_rating(rating_id, requester_id).await?;
        if existing.state.is_confirmed() {
            return Ok(existing);
        }

        let state = self.policy.on_confirm();
        self.ratings.set_state(rating_id, state).await?;

        tracing::info!(rating_id, user_id = requester_id, "rating confirmed");
        Ok(Rating { state, ..existing })
    }

    /// Removes the rating and its likes
    pub async fn delete(&self, rating_id: i64, requester_id: i64) -> AppResult<()> {
        self.owned_rating(rating_id, requester_id).await?;
        self.ratings.delete(rating_id).await?;
        tracing::info!(rating_id, user_id = requester_id, "rating deleted");
        Ok(())
    }

    pub async fn get(&self, rating_id: i64) -> AppResult<Rating> {
        self.ratings
            .find_by_id(rating_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rating {rating_id} not found")))
    }

    /// Ratings for a media entry; `confirmed_only` selects the public view
    pub async fn ratings_for_media(
        &self,
        media_id: i64,
        confirmed_only: bool,
    ) -> AppResult<Vec<Rating>> {
        self.ratings.list_by_media(media_id, confirmed_only).await
    }

    /// A user's full history, drafts included
    pub async fn history(&self, user_id: i64) -> AppResult<Vec<Rating>> {
        self.ratings.list_by_user(user_id).await
    }

    /// Likes a rating. Liking twice has no additional effect; nothing stops
    /// a user from liking their own rating.
    pub async fn like(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        if self.ratings.find_by_id(rating_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Rating {rating_id} not found")));
        }
        self.ratings.insert_like(rating_id, user_id).await
    }

    /// Removes a like; unliking a rating that was never liked is a no-op
    pub async fn unlike(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        self.ratings.delete_like(rating_id, user_id).await
    }

    async fn owned_rating(&self, rating_id: i64, requester_id: i64) -> AppResult<Rating> {
        let rating = self
            .ratings
            .find_by_id(rating_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rating {rating_id} not found")))?;
        if rating.user_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the rating's owner may modify it".to_string(),
            ));
        }
        Ok(rating)
    }
}

fn validate_stars(stars: i32) -> AppResult<()> {
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(AppError::InvalidInput(format!(
            "Stars must be between {MIN_STARS} and {MAX_STARS}"
        )));
    }
    Ok(())
}
