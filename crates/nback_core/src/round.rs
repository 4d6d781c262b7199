//! The per-round state machine and its scoring rule.
//!
//! A [`Round`] is driven from outside: something calls [`Round::present`]
//! once per tick and [`Round::finish`] after the last stimulus. Player claims
//! arrive through [`Round::check_match`] at any point in between.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::invariants::{InvariantSet, RoundInvariants};
use crate::{GameMode, GameState, Stimulus, StimulusSequence};

/// Result of a match claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// No stimulus is being presented; nothing recorded.
    Inactive,
    /// The current stimulus was already claimed; nothing changed.
    AlreadyClaimed,
    /// Claimed before a comparison was possible; recorded, not scored.
    TooEarly,
    /// The stimulus repeats the one N steps back; score incremented.
    Correct,
    /// The stimulus does not repeat; score decremented, floored at zero.
    Incorrect,
}

impl MatchOutcome {
    /// Whether the claim was recorded in the acknowledged set.
    pub fn is_recorded(self) -> bool {
        matches!(
            self,
            MatchOutcome::TooEarly | MatchOutcome::Correct | MatchOutcome::Incorrect
        )
    }
}

/// Tally of a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoundSummary {
    score: u32,
    correct: u32,
    incorrect: u32,
    missed: u32,
    presented: usize,
}

/// One round of N-back play.
#[derive(Debug, Clone)]
pub struct Round {
    pub(crate) n_back: usize,
    pub(crate) sequence: StimulusSequence,
    pub(crate) state: GameState,
    pub(crate) score: u32,
    pub(crate) correct: u32,
    pub(crate) incorrect: u32,
    pub(crate) highest_presented: Option<usize>,
    pub(crate) finished: bool,
}

impl Round {
    /// Creates an idle round over `sequence`.
    #[instrument(skip(sequence), fields(length = sequence.len()))]
    pub fn new(mode: GameMode, n_back: usize, sequence: StimulusSequence) -> Self {
        Self {
            n_back,
            sequence,
            state: GameState::idle(mode),
            score: 0,
            correct: 0,
            incorrect: 0,
            highest_presented: None,
            finished: false,
        }
    }

    /// Current snapshot for presentation.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Comparison distance.
    pub fn n_back(&self) -> usize {
        self.n_back
    }

    /// The sequence being played.
    pub fn sequence(&self) -> &StimulusSequence {
        &self.sequence
    }

    /// Whether [`Round::finish`] has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index the next call to [`Round::present`] must use.
    pub fn next_index(&self) -> usize {
        self.highest_presented.map_or(0, |i| i + 1)
    }

    /// Presents the stimulus at `index`.
    ///
    /// Indices advance one at a time from zero. Returns `None` and leaves
    /// the round untouched if `index` is not the next index, is out of range,
    /// or the round is finished.
    #[instrument(skip(self), fields(mode = %self.state.mode))]
    pub fn present(&mut self, index: usize) -> Option<Stimulus> {
        if self.finished || index != self.next_index() {
            debug!(expected = self.next_index(), "Out-of-order presentation ignored");
            return None;
        }
        let value = self.sequence.get(index)?;
        let stimulus = Stimulus { index, value };

        self.state.current = Some(stimulus);
        if self.state.mode == GameMode::Visual {
            self.state.alternate_style = index % 2 == 1;
        }
        self.highest_presented = Some(index);

        debug!(index, value, "Stimulus presented");
        assert_invariants(self);
        Some(stimulus)
    }

    /// Scores a "match" claim against the current stimulus.
    ///
    /// A position can be claimed once. Claims at positions before `n_back`
    /// are recorded but not scored. A correct claim adds one point, a wrong
    /// claim removes one, and the score never drops below zero.
    #[instrument(skip(self), fields(index = ?self.state.current_index(), score = self.score))]
    pub fn check_match(&mut self) -> MatchOutcome {
        let Some(Stimulus { index, .. }) = self.state.current else {
            return MatchOutcome::Inactive;
        };
        if !self.state.acknowledged.insert(index) {
            return MatchOutcome::AlreadyClaimed;
        }

        let outcome = if index < self.n_back {
            MatchOutcome::TooEarly
        } else if self.sequence.is_match(index, self.n_back) {
            self.score += 1;
            self.correct += 1;
            MatchOutcome::Correct
        } else {
            self.score = self.score.saturating_sub(1);
            self.incorrect += 1;
            MatchOutcome::Incorrect
        };

        debug!(?outcome, score = self.score, "Match claim scored");
        assert_invariants(self);
        outcome
    }

    /// Ends the round, clearing the current stimulus.
    #[instrument(skip(self))]
    pub fn finish(&mut self) -> RoundSummary {
        self.state.current = None;
        self.finished = true;
        assert_invariants(self);
        self.summary()
    }

    /// Tally of the round so far.
    pub fn summary(&self) -> RoundSummary {
        let presented = self.next_index();
        let missed = (self.n_back..presented)
            .filter(|&i| self.sequence.is_match(i, self.n_back))
            .filter(|i| !self.state.acknowledged.contains(i))
            .count();
        RoundSummary {
            score: self.score,
            correct: self.correct,
            incorrect: self.incorrect,
            missed: u32::try_from(missed).unwrap_or(u32::MAX),
            presented,
        }
    }
}

/// Checks the round invariants in debug builds.
fn assert_invariants(round: &Round) {
    if cfg!(debug_assertions)
        && let Err(violations) = RoundInvariants::check_all(round)
    {
        panic!("Round invariants violated: {violations:?}");
    }
}
