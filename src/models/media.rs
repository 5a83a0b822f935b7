use serde::{Deserialize, Serialize};

/// A catalogued media entry (movie, series, game, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaEntry {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Free-form content type tag, e.g. "Movie" or "Series"
    pub media_type: String,
    pub release_year: i32,
    /// A media entry may carry any number of genres
    pub genres: Vec<String>,
    pub age_restriction: i32,
    pub creator_id: i64,
}

/// Fields for creating or replacing a media entry
#[derive(Debug, Clone, Deserialize)]
pub struct MediaDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media_type: String,
    pub release_year: i32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub age_restriction: i32,
}

/// Sort order for media listings
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaSort {
    Title,
    Year,
    /// Average score, highest first
    Score,
}

/// Filter predicates for media listings
///
/// Scalar predicates are applied by the store; `min_rating` and `sort_by`
/// depend on derived aggregates and are applied by the catalog service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaFilter {
    /// Case-insensitive title substring
    pub title: Option<String>,
    pub genre: Option<String>,
    pub media_type: Option<String>,
    pub release_year: Option<i32>,
    /// Upper bound: only entries with age_restriction <= this value
    pub age_restriction: Option<i32>,
    /// Lower bound on the average score over confirmed ratings
    pub min_rating: Option<f64>,
    pub sort_by: Option<MediaSort>,
}

/// A media entry with its on-demand aggregates attached
#[derive(Debug, Clone, Serialize)]
pub struct MediaView {
    #[serde(flatten)]
    pub entry: MediaEntry,
    pub average_rating: f64,
    pub rating_count: u64,
}
