//! Stimulus modality of a round.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which channel the stimuli are presented on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameMode {
    /// Highlighted cells on a 3x3 grid.
    #[default]
    Visual,
    /// Spoken letter cues.
    Audio,
    /// Both channels at once.
    ///
    /// Not playable yet: how claims map onto the two channels is undecided.
    #[strum(to_string = "audiovisual", serialize = "audio-visual")]
    AudioVisual,
}

impl GameMode {
    /// Returns whether a round can currently be run in this mode.
    pub fn is_playable(self) -> bool {
        !matches!(self, GameMode::AudioVisual)
    }

    /// Returns whether stimuli in this mode trigger sound playback.
    pub fn plays_audio(self) -> bool {
        matches!(self, GameMode::Audio | GameMode::AudioVisual)
    }

    /// Returns whether the grid is meaningful in this mode.
    pub fn shows_grid(self) -> bool {
        matches!(self, GameMode::Visual | GameMode::AudioVisual)
    }

    /// Display label for menus.
    pub fn label(self) -> &'static str {
        match self {
            GameMode::Visual => "Visual",
            GameMode::Audio => "Audio",
            GameMode::AudioVisual => "Audio + Visual",
        }
    }
}
