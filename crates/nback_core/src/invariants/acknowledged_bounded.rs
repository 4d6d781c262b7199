//! Acknowledged bound invariant: claims only cover presented positions.

use super::Invariant;
use crate::Round;

/// Invariant: every acknowledged index has already been presented.
///
/// Claims are recorded against the current stimulus, so no index beyond the
/// highest presented one can appear. Nothing is acknowledged before the
/// first stimulus.
pub struct AcknowledgedBoundedInvariant;

impl Invariant<Round> for AcknowledgedBoundedInvariant {
    fn holds(round: &Round) -> bool {
        match (round.highest_presented, round.state.acknowledged.last()) {
            (_, None) => true,
            (Some(highest), Some(&last)) => last <= highest,
            (None, Some(_)) => false,
        }
    }

    fn description() -> &'static str {
        "Acknowledged indices never exceed the highest presented index"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameMode, StimulusSequence};

    fn round() -> Round {
        Round::new(GameMode::Visual, 1, StimulusSequence::new(vec![1, 1, 1]))
    }

    #[test]
    fn test_claims_on_presented_positions_hold() {
        let mut r = round();
        r.present(0);
        r.check_match();
        r.present(1);
        r.check_match();
        assert!(AcknowledgedBoundedInvariant::holds(&r));
    }

    #[test]
    fn test_claim_before_first_stimulus_violates() {
        let mut r = round();
        r.state.acknowledged.insert(0);
        assert!(!AcknowledgedBoundedInvariant::holds(&r));
    }

    #[test]
    fn test_claim_ahead_of_playback_violates() {
        let mut r = round();
        r.present(0);
        r.state.acknowledged.insert(2);
        assert!(!AcknowledgedBoundedInvariant::holds(&r));
    }
}
