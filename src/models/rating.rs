use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a rating
///
/// Every rating enters `Draft` on submission and drops back to `Draft` on
/// every edit; only `Confirmed` ratings are visible to other users and
/// counted by public aggregates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatingState {
    Draft,
    Confirmed,
}

impl RatingState {
    /// Whether this state counts toward public views and aggregates
    pub fn is_confirmed(self) -> bool {
        matches!(self, RatingState::Confirmed)
    }

    /// Maps the storage-level confirmation flag to a state
    pub fn from_confirmed(confirmed: bool) -> Self {
        if confirmed {
            RatingState::Confirmed
        } else {
            RatingState::Draft
        }
    }
}

/// One user's opinion of one media entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub id: i64,
    pub media_id: i64,
    pub user_id: i64,
    /// Star score, always within [1, 5]
    pub stars: i32,
    pub comment: Option<String>,
    pub state: RatingState,
    pub created_at: DateTime<Utc>,
}

/// Fields of a rating row about to be inserted
///
/// The state is decided by the moderation policy before this reaches a store.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub media_id: i64,
    pub user_id: i64,
    pub stars: i32,
    pub comment: Option<String>,
    pub state: RatingState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_confirmed_flag() {
        assert_eq!(RatingState::from_confirmed(true), RatingState::Confirmed);
        assert_eq!(RatingState::from_confirmed(false), RatingState::Draft);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&RatingState::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&RatingState::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
