//! First-class invariants for N-back rounds.
//!
//! Invariants are logical properties that must hold throughout a round.
//! They are testable independently and serve as documentation of system guarantees.

mod acknowledged_bounded;
mod progress;
mod score_bounded;

pub use acknowledged_bounded::AcknowledgedBoundedInvariant;
pub use progress::ProgressInvariant;
pub use score_bounded::ScoreBoundedInvariant;

/// A logical property that must hold for a given state.
///
/// Invariants express system guarantees that should never be violated.
/// They are checked in debug builds and can be tested independently.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        collect::<S, I1>(state, &mut violations);
        collect::<S, I2>(state, &mut violations);
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        collect::<S, I1>(state, &mut violations);
        collect::<S, I2>(state, &mut violations);
        collect::<S, I3>(state, &mut violations);
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }
}

/// All round invariants as a composable set.
pub type RoundInvariants = (
    AcknowledgedBoundedInvariant,
    ProgressInvariant,
    ScoreBoundedInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameMode, Round, StimulusSequence};

    fn round() -> Round {
        Round::new(GameMode::Visual, 2, StimulusSequence::new(vec![2, 5, 2, 7]))
    }

    #[test]
    fn test_invariant_set_holds_for_fresh_round() {
        assert!(RoundInvariants::check_all(&round()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_through_play() {
        let mut r = round();
        for i in 0..4 {
            r.present(i);
            r.check_match();
            assert!(RoundInvariants::check_all(&r).is_ok());
        }
        r.finish();
        assert!(RoundInvariants::check_all(&r).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut r = round();
        r.present(0);
        r.state.acknowledged.insert(3);
        r.score = 5;

        let violations = RoundInvariants::check_all(&r).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (ProgressInvariant, ScoreBoundedInvariant);
        assert!(TwoInvariants::check_all(&round()).is_ok());
    }
}
