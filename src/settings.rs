//! Application settings loaded from TOML.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use nback_core::GameConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Settings for the `nback` binary.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the SQLite file holding the highscore.
    #[serde(default = "default_database")]
    database: String,

    /// File the terminal UI writes its log to.
    #[serde(default = "default_log_file")]
    log_file: String,

    /// Fixed seed for sequence generation. Random when absent.
    #[serde(default)]
    seed: Option<u64>,

    /// Round parameters.
    #[serde(default)]
    game: GameConfig,
}

#[instrument]
fn default_database() -> String {
    "nback.db".to_string()
}

#[instrument]
fn default_log_file() -> String {
    "nback.log".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: default_database(),
            log_file: default_log_file(),
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SettingsError::new(format!("Failed to read settings file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the text is not valid settings TOML.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SettingsError::new(format!("Failed to parse settings: {}", e)))?;
        info!(database = %settings.database, "Settings loaded");
        Ok(settings)
    }

    /// Loads settings from `path` if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file exists but cannot be loaded.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Settings file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the database path.
    pub fn set_database(&mut self, database: String) {
        self.database = database;
    }

    /// Overrides the seed.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    /// Mutable round parameters, for command-line overrides.
    pub fn game_mut(&mut self) -> &mut GameConfig {
        &mut self.game
    }
}

/// Settings error.
#[derive(Debug, Clone, Display, Error)]
#[display("Settings error: {} at {}:{}", message, file, line)]
pub struct SettingsError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SettingsError {
    /// Creates a new settings error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
