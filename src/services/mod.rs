pub mod accounts;
pub mod aggregation;
pub mod catalog;
pub mod favorites;
pub mod moderation;
pub mod ratings;
pub mod recommendations;

pub use accounts::AccountService;
pub use aggregation::AggregationService;
pub use catalog::CatalogService;
pub use favorites::FavoritesService;
pub use moderation::ModerationPolicy;
pub use ratings::RatingService;
pub use recommendations::{RecommendationService, Strategy};
