//! N-back trainer library - session host, persistence and terminal UI
//!
//! Game rules live in [`nback_core`]; this crate runs them in real time.
//!
//! # Architecture
//!
//! - **Session**: [`GameSession`] drives a timed loop over a round and
//!   publishes state on watch channels
//! - **Highscore**: [`HighscoreStore`] with SQLite and in-memory backends
//! - **Audio**: [`SoundPlayer`] cues for audio rounds
//! - **TUI**: ratatui front end over a session
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nback::{GameConfig, GameSession, MemoryHighscoreStore, SeededGenerator, SilentPlayer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = GameSession::new(
//!     GameConfig::default(),
//!     SeededGenerator::new(7),
//!     Arc::new(MemoryHighscoreStore::default()),
//!     Arc::new(SilentPlayer),
//! );
//! session.start().await?;
//! let summary = session.wait_for_completion().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod audio;
mod db;
mod highscore;
mod session;
mod settings;
mod tui;

// Crate-level exports - Session
pub use session::{GameSession, SessionError};

// Crate-level exports - Highscore persistence
pub use db::{DbError, DbErrorKind, HighscoreRepository, HighscoreRow};
pub use highscore::{HighscoreError, HighscoreStore, MemoryHighscoreStore, SqliteHighscoreStore};

// Crate-level exports - Audio
pub use audio::{SilentPlayer, SoundBank, SoundPlayer, TerminalBell};

// Crate-level exports - Settings
pub use settings::{Settings, SettingsError};

// Crate-level exports - Terminal UI
pub use tui::{Controller, Screen, ScreenTransition, run_tui};

// Crate-level exports - Core game types
pub use nback_core::{
    ConfigError, GameConfig, GameMode, GameState, MatchOutcome, Round, RoundSummary,
    ScriptedGenerator, SeededGenerator, SequenceGenerator, SequenceParams, Stimulus,
    StimulusSequence,
};
