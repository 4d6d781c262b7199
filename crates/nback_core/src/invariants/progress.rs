//! Progress invariant: the current stimulus is the latest one presented.

use super::Invariant;
use crate::Round;

/// Invariant: while a stimulus is shown it is the most recently presented
/// position, its value matches the sequence, and the round is not finished.
pub struct ProgressInvariant;

impl Invariant<Round> for ProgressInvariant {
    fn holds(round: &Round) -> bool {
        let Some(current) = round.state.current else {
            return true;
        };
        !round.finished
            && round.highest_presented == Some(current.index)
            && round.sequence.get(current.index) == Some(current.value)
    }

    fn description() -> &'static str {
        "Current stimulus is the latest presented one and agrees with the sequence"
    }
}
