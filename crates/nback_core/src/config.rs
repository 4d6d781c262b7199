//! Round configuration and its validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::GameMode;

/// Parameters fixed for the duration of one round.
///
/// Deserializes with per-field defaults, so a partial TOML table such as
/// `n_back = 3` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    mode: GameMode,
    n_back: usize,
    length: usize,
    symbol_space: u8,
    match_count: usize,
    tick_interval_ms: u64,
}

impl GameConfig {
    /// Default distance back to compare against.
    pub const DEFAULT_N_BACK: usize = 2;
    /// Default number of stimuli per round.
    pub const DEFAULT_LENGTH: usize = 10;
    /// Default number of distinct symbols (one per grid cell).
    pub const DEFAULT_SYMBOL_SPACE: u8 = 9;
    /// Default number of embedded matches (30% of a default round).
    pub const DEFAULT_MATCH_COUNT: usize = 3;
    /// Default time each stimulus stays on screen.
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

    /// Creates the default configuration for the given mode.
    #[instrument]
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Stimulus modality.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Distance back a stimulus is compared against.
    pub fn n_back(&self) -> usize {
        self.n_back
    }

    /// Number of stimuli in a round.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct symbol codes, `0..symbol_space`.
    pub fn symbol_space(&self) -> u8 {
        self.symbol_space
    }

    /// Number of N-back matches embedded in each sequence.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Time between two stimuli.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the N-back distance.
    pub fn with_n_back(mut self, n_back: usize) -> Self {
        self.n_back = n_back;
        self
    }

    /// Sets the sequence length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets the number of distinct symbols.
    pub fn with_symbol_space(mut self, symbol_space: u8) -> Self {
        self.symbol_space = symbol_space;
        self
    }

    /// Sets the number of embedded matches.
    pub fn with_match_count(mut self, match_count: usize) -> Self {
        self.match_count = match_count;
        self
    }

    /// Sets the tick interval. Sub-millisecond precision is dropped.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Mutable access to the mode, for settings screens.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    /// Mutable access to the N-back distance, for settings screens.
    pub fn set_n_back(&mut self, n_back: usize) {
        self.n_back = n_back;
    }

    /// Checks that a sequence satisfying this configuration can exist.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    #[instrument(skip(self), fields(n_back = self.n_back, length = self.length))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_back == 0 {
            return Err(ConfigError::ZeroNBack);
        }
        if self.length == 0 {
            return Err(ConfigError::EmptySequence);
        }
        if self.n_back >= self.length {
            return Err(ConfigError::NBackTooLarge {
                n_back: self.n_back,
                length: self.length,
            });
        }
        if self.symbol_space < 2 {
            return Err(ConfigError::SymbolSpaceTooSmall(self.symbol_space));
        }
        let available = self.length - self.n_back;
        if self.match_count > available {
            return Err(ConfigError::TooManyMatches {
                requested: self.match_count,
                available,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            n_back: Self::DEFAULT_N_BACK,
            length: Self::DEFAULT_LENGTH,
            symbol_space: Self::DEFAULT_SYMBOL_SPACE,
            match_count: Self::DEFAULT_MATCH_COUNT,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Reason a [`GameConfig`] cannot produce a round.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// N-back distance of zero compares a stimulus with itself.
    #[display("N-back distance must be at least 1")]
    ZeroNBack,

    /// A round needs at least one stimulus.
    #[display("Sequence length must be at least 1")]
    EmptySequence,

    /// No position in the sequence could ever be scored.
    #[display("N-back distance {} must be smaller than sequence length {}", n_back, length)]
    NBackTooLarge {
        /// Requested distance.
        n_back: usize,
        /// Requested sequence length.
        length: usize,
    },

    /// Non-matching positions need a symbol different from their N-back partner.
    #[display("Symbol space {} is too small, need at least 2 symbols", _0)]
    SymbolSpaceTooSmall(#[error(not(source))] u8),

    /// More matches requested than positions that can hold one.
    #[display("Cannot embed {} matches, only {} positions are comparable", requested, available)]
    TooManyMatches {
        /// Requested match count.
        requested: usize,
        /// Positions `n_back..length`.
        available: usize,
    },

    /// Stimuli would advance without pause.
    #[display("Tick interval must be positive")]
    ZeroTickInterval,
}
