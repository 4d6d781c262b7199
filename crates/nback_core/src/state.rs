//! Observable snapshot of a round.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{GameMode, Stimulus};

/// What a presentation layer needs to draw the current round.
///
/// `current` is `None` while no stimulus is shown (before the first tick and
/// after the last). Index and value are set and cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Mode of the round being shown, or of the next round when idle.
    pub mode: GameMode,
    /// Stimulus currently presented.
    pub current: Option<Stimulus>,
    /// Positions the player has already claimed as matches.
    pub acknowledged: BTreeSet<usize>,
    /// Cosmetic flag alternating with index parity in visual rounds.
    pub alternate_style: bool,
}

impl GameState {
    /// Idle state for the given mode.
    pub fn idle(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Index of the current stimulus.
    pub fn current_index(&self) -> Option<usize> {
        self.current.map(|s| s.index)
    }

    /// Symbol of the current stimulus.
    pub fn current_value(&self) -> Option<u8> {
        self.current.map(|s| s.value)
    }

    /// Whether a stimulus is being presented.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the player already claimed position `index`.
    pub fn is_acknowledged(&self, index: usize) -> bool {
        self.acknowledged.contains(&index)
    }

    /// Whether the player already claimed the current stimulus.
    pub fn current_acknowledged(&self) -> bool {
        self.current_index()
            .is_some_and(|index| self.is_acknowledged(index))
    }
}
