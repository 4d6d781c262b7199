//! Pure N-back game logic.
//!
//! This crate knows nothing about timers, audio or storage. It provides:
//!
//! - **Configuration**: [`GameConfig`] with validation
//! - **Sequences**: [`StimulusSequence`] and the [`SequenceGenerator`] trait
//! - **Rounds**: the [`Round`] state machine and its scoring rule
//! - **Invariants**: first-class properties checked in debug builds
//!
//! # Example
//!
//! ```
//! use nback_core::{GameMode, MatchOutcome, Round, StimulusSequence};
//!
//! let sequence = StimulusSequence::new(vec![2, 5, 2, 7, 7, 7]);
//! let mut round = Round::new(GameMode::Visual, 2, sequence);
//!
//! for index in 0..=2 {
//!     round.present(index);
//! }
//! assert_eq!(round.check_match(), MatchOutcome::Correct);
//! assert_eq!(round.score(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod generator;
pub mod invariants;
mod mode;
mod round;
mod sequence;
mod state;

pub use config::{ConfigError, GameConfig};
pub use generator::{ScriptedGenerator, SeededGenerator, SequenceGenerator, SequenceParams};
pub use mode::GameMode;
pub use round::{MatchOutcome, Round, RoundSummary};
pub use sequence::{Stimulus, StimulusSequence};
pub use state::GameState;
