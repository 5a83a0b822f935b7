use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{FavoriteStore, MediaStore, MemoryStore, PgStore, RatingStore, UserStore};
use crate::services::{
    AccountService, AggregationService, CatalogService, FavoritesService, RatingService,
    RecommendationService,
};

/// Shared application state
///
/// A bundle of cheaply clonable services, each holding its store
/// collaborators behind `Arc<dyn Trait>` handles.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub ratings: RatingService,
    pub aggregation: AggregationService,
    pub recommendations: RecommendationService,
    pub favorites: FavoritesService,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::from_stores(store.clone(), store.clone(), store.clone(), store)
    }

    /// State backed by the in-process store; used by tests and local
    /// development without a database
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_stores(store.clone(), store.clone(), store.clone(), store)
    }

    fn from_stores(
        users: Arc<dyn UserStore>,
        media: Arc<dyn MediaStore>,
        ratings: Arc<dyn RatingStore>,
        favorites: Arc<dyn FavoriteStore>,
    ) -> Self {
        let aggregation = AggregationService::new(ratings.clone(), users.clone(), media.clone());
        Self {
            accounts: AccountService::new(users),
            catalog: CatalogService::new(media.clone(), aggregation.clone()),
            ratings: RatingService::new(ratings.clone(), media.clone()),
            recommendations: RecommendationService::new(
                ratings,
                media.clone(),
                aggregation.clone(),
            ),
            favorites: FavoritesService::new(favorites, media, aggregation.clone()),
            aggregation,
        }
    }
}
