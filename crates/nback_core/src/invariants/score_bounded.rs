//! Score bound invariant: points only come from correct, recorded claims.

use super::Invariant;
use crate::Round;

/// Invariant: `score <= correct <= acknowledged`.
///
/// Each acknowledged position can add at most one point.
pub struct ScoreBoundedInvariant;

impl Invariant<Round> for ScoreBoundedInvariant {
    fn holds(round: &Round) -> bool {
        let recorded = round.state.acknowledged.len();
        round.score <= round.correct
            && usize::try_from(round.correct + round.incorrect).is_ok_and(|n| n <= recorded)
    }

    fn description() -> &'static str {
        "Score never exceeds the number of correct claims"
    }
}
