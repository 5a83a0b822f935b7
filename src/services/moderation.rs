use crate::models::RatingState;

/// The rule object for rating visibility
///
/// Every rating is born unconfirmed and must be confirmed explicitly by its
/// owner before it counts toward public views and aggregates. Editing a
/// rating throws it back to draft no matter what state it was in, so edited
/// content never stays public without re-confirmation. Keeping these rules
/// in one place keeps them out of the store plumbing and independently
/// testable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModerationPolicy;

impl ModerationPolicy {
    pub fn new() -> Self {
        Self
    }

    /// State of a freshly submitted rating, comment or not
    pub fn on_submit(&self) -> RatingState {
        RatingState::Draft
    }

    /// State after any edit to score or comment
    pub fn on_edit(&self, _current: RatingState) -> RatingState {
        RatingState::Draft
    }

    /// State after the owner's explicit confirmation
    pub fn on_confirm(&self) -> RatingState {
        RatingState::Confirmed
    }

    /// Whether a rating in this state is visible outside its owner
    pub fn is_public(&self, state: RatingState) -> bool {
        state.is_confirmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_always_starts_draft() {
        let policy = ModerationPolicy::new();
        assert_eq!(policy.on_submit(), RatingState::Draft);
    }

    #[test]
    fn test_edit_resets_any_state_to_draft() {
        let policy = ModerationPolicy::new();
        assert_eq!(policy.on_edit(RatingState::Draft), RatingState::Draft);
        assert_eq!(policy.on_edit(RatingState::Confirmed), RatingState::Draft);
    }

    #[test]
    fn test_confirm_is_the_only_way_to_public() {
        let policy = ModerationPolicy::new();
        assert_eq!(policy.on_confirm(), RatingState::Confirmed);
        assert!(!policy.is_public(policy.on_submit()));
        assert!(policy.is_public(policy.on_confirm()));
        assert!(!policy.is_public(policy.on_edit(policy.on_confirm())));
    }
}
