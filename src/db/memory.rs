use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::{FavoriteStore, MediaStore, RatingStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{MediaDraft, MediaEntry, MediaFilter, NewRating, Rating, RatingState, User};

/// In-process store backend
///
/// Implements every store trait over locked hash maps, with the same
/// conflict and idempotency semantics as the PostgreSQL backend. Backs the
/// test suites and local development without a database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    media: HashMap<i64, MediaEntry>,
    ratings: HashMap<i64, Rating>,
    likes: HashSet<(i64, i64)>,
    favorites: Vec<(i64, i64)>,
    next_user_id: i64,
    next_media_id: i64,
    next_rating_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            token: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn set_token(&self, user_id: i64, token: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.token = Some(token.to_string());
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}

#[async_trait::async_trait]
impl MediaStore for MemoryStore {
    async fn insert(&self, draft: MediaDraft, creator_id: i64) -> AppResult<MediaEntry> {
        let mut inner = self.inner.write().await;
        inner.next_media_id += 1;
        let entry = MediaEntry {
            id: inner.next_media_id,
            title: draft.title,
            description: draft.description,
            media_type: draft.media_type,
            release_year: draft.release_year,
            genres: draft.genres,
            age_restriction: draft.age_restriction,
            creator_id,
        };
        inner.media.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: i64, draft: MediaDraft) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.media.get_mut(&id) {
            entry.title = draft.title;
            entry.description = draft.description;
            entry.media_type = draft.media_type;
            entry.release_year = draft.release_year;
            entry.genres = draft.genres;
            entry.age_restriction = draft.age_restriction;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.media.remove(&id);
        // Cascade the way the database foreign keys would
        let orphaned: Vec<i64> = inner
            .ratings
            .values()
            .filter(|r| r.media_id == id)
            .map(|r| r.id)
            .collect();
        for rating_id in orphaned {
            inner.ratings.remove(&rating_id);
            inner.likes.retain(|(rid, _)| *rid != rating_id);
        }
        inner.favorites.retain(|(_, mid)| *mid != id);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<MediaEntry>> {
        Ok(self.inner.read().await.media.get(&id).cloned())
    }

    async fn list(&self, filter: &MediaFilter) -> AppResult<Vec<MediaEntry>> {
        let inner = self.inner.read().await;
        let title_needle = filter.title.as_ref().map(|t| t.to_lowercase());
        let mut entries: Vec<MediaEntry> = inner
            .media
            .values()
            .filter(|m| {
                title_needle
                    .as_ref()
                    .is_none_or(|needle| m.title.to_lowercase().contains(needle))
            })
            .filter(|m| filter.genre.as_ref().is_none_or(|g| m.genres.contains(g)))
            .filter(|m| {
                filter
                    .media_type
                    .as_ref()
                    .is_none_or(|t| &m.media_type == t)
            })
            .filter(|m| filter.release_year.is_none_or(|y| m.release_year == y))
            .filter(|m| {
                filter
                    .age_restriction
                    .is_none_or(|a| m.age_restriction <= a)
            })
            .cloned()
            .collect();
        entries.sort_by_key(|m| m.id);
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl RatingStore for MemoryStore {
    async fn insert(&self, rating: NewRating) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .ratings
            .values()
            .any(|r| r.media_id == rating.media_id && r.user_id == rating.user_id);
        if duplicate {
            return Err(AppError::DuplicateRating);
        }
        inner.next_rating_id += 1;
        let stored = Rating {
            id: inner.next_rating_id,
            media_id: rating.media_id,
            user_id: rating.user_id,
            stars: rating.stars,
            comment: rating.comment,
            state: rating.state,
            created_at: Utc::now(),
        };
        inner.ratings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_content(
        &self,
        id: i64,
        stars: i32,
        comment: Option<String>,
        state: RatingState,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(rating) = inner.ratings.get_mut(&id) {
            rating.stars = stars;
            rating.comment = comment;
            rating.state = state;
        }
        Ok(())
    }

    async fn set_state(&self, id: i64, state: RatingState) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(rating) = inner.ratings.get_mut(&id) {
            rating.state = state;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.ratings.remove(&id);
        inner.likes.retain(|(rating_id, _)| *rating_id != id);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Rating>> {
        Ok(self.inner.read().await.ratings.get(&id).cloned())
    }

    async fn list_by_media(&self, media_id: i64, confirmed_only: bool) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        let mut ratings: Vec<Rating> = inner
            .ratings
            .values()
            .filter(|r| r.media_id == media_id)
            .filter(|r| !confirmed_only || r.state.is_confirmed())
            .cloned()
            .collect();
        // Newest first, matching the database ordering
        ratings.sort_by_key(|r| std::cmp::Reverse(r.id));
        Ok(ratings)
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        let mut ratings: Vec<Rating> = inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.id);
        Ok(ratings)
    }

    async fn count_by_user(&self, user_id: i64) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.ratings.values().filter(|r| r.user_id == user_id).count() as u64)
    }

    async fn insert_like(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.likes.insert((rating_id, user_id));
        Ok(())
    }

    async fn delete_like(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.likes.remove(&(rating_id, user_id));
        Ok(())
    }

    async fn count_likes(&self, rating_id: i64) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.likes.iter().filter(|(rid, _)| *rid == rating_id).count() as u64)
    }
}

#[async_trait::async_trait]
impl FavoriteStore for MemoryStore {
    async fn insert(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.favorites.contains(&(user_id, media_id)) {
            inner.favorites.push((user_id, media_id));
        }
        Ok(())
    }

    async fn delete(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.favorites.retain(|pair| *pair != (user_id, media_id));
        Ok(())
    }

    async fn list_media_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, mid)| *mid)
            .collect())
    }
}
