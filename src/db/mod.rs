use async_trait::async_trait;

/// Persistent store abstraction
///
/// Every component receives its stores as injected `Arc<dyn ...>` handles;
/// there is no ambient connection. Two backends implement these traits: the
/// PostgreSQL backend used in production and an in-process memory backend
/// used by tests and local development.
use crate::error::AppResult;
use crate::models::{MediaDraft, MediaEntry, MediaFilter, NewRating, Rating, RatingState, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, init_schema, PgStore};

/// Account rows
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. A taken username surfaces as `Conflict`,
    /// reported by the backend as a conflict outcome rather than inferred
    /// from a driver error code.
    async fn insert(&self, username: &str, password_hash: &str) -> AppResult<User>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Replaces the user's session token
    async fn set_token(&self, user_id: i64, token: &str) -> AppResult<()>;

    /// All users in id order
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Media catalogue rows
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert(&self, draft: MediaDraft, creator_id: i64) -> AppResult<MediaEntry>;

    async fn update(&self, id: i64, draft: MediaDraft) -> AppResult<()>;

    /// Removes the entry; ratings and favorites referencing it go with it
    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<MediaEntry>>;

    /// Applies the filter's scalar predicates (title substring, genre,
    /// media type, release year, age ceiling). Aggregate-dependent
    /// predicates are the catalog service's concern.
    async fn list(&self, filter: &MediaFilter) -> AppResult<Vec<MediaEntry>>;
}

/// Rating and like rows; the single writer of rating state
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Inserts a rating. The store is the uniqueness arbiter for the
    /// (user, media) pair: a second row for the same pair is a
    /// `DuplicateRating` conflict outcome, never a silent overwrite.
    async fn insert(&self, rating: NewRating) -> AppResult<Rating>;

    /// Rewrites score and comment and applies the given moderation state
    async fn update_content(
        &self,
        id: i64,
        stars: i32,
        comment: Option<String>,
        state: RatingState,
    ) -> AppResult<()>;

    async fn set_state(&self, id: i64, state: RatingState) -> AppResult<()>;

    /// Removes the rating and cascades removal of its likes
    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Rating>>;

    /// Ratings for one media entry, newest first. `confirmed_only` selects
    /// the public view; the unfiltered view backs self-history and
    /// recommendation input.
    async fn list_by_media(&self, media_id: i64, confirmed_only: bool) -> AppResult<Vec<Rating>>;

    /// A user's full rating history in submission order, any state
    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Rating>>;

    /// Total ratings by the user, any state
    async fn count_by_user(&self, user_id: i64) -> AppResult<u64>;

    /// Idempotent: liking twice leaves a single like row
    async fn insert_like(&self, rating_id: i64, user_id: i64) -> AppResult<()>;

    /// Idempotent: unliking a rating that was never liked is a no-op
    async fn delete_like(&self, rating_id: i64, user_id: i64) -> AppResult<()>;

    async fn count_likes(&self, rating_id: i64) -> AppResult<u64>;
}

/// Favorite rows, a (user, media) relation
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Idempotent add
    async fn insert(&self, user_id: i64, media_id: i64) -> AppResult<()>;

    /// Idempotent remove
    async fn delete(&self, user_id: i64, media_id: i64) -> AppResult<()>;

    /// Media ids favorited by the user, in insertion order
    async fn list_media_ids(&self, user_id: i64) -> AppResult<Vec<i64>>;
}
