pub mod media;
pub mod rating;
pub mod user;

pub use media::{MediaDraft, MediaEntry, MediaFilter, MediaSort, MediaView};
pub use rating::{NewRating, Rating, RatingState};
pub use user::{LeaderboardEntry, User, UserProfile};
