//! Command-line interface for nback.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use nback_core::GameMode;

use nback::Settings;

/// N-back trainer - working-memory game for the terminal
#[derive(Parser, Debug)]
#[command(name = "nback")]
#[command(about = "N-back working-memory trainer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML settings file (optional)
    #[arg(short, long, global = true, default_value = "nback.toml")]
    pub config: PathBuf,

    /// Override the highscore database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a round in the terminal
    Play(RoundArgs),

    /// Print the stored highscore
    Highscore,

    /// Clear the stored highscore
    ResetHighscore,

    /// Generate a sequence and print it as JSON
    Sequence(RoundArgs),
}

/// Round parameter overrides shared by `play` and `sequence`.
#[derive(Args, Debug, Default, Clone)]
pub struct RoundArgs {
    /// Stimulus channel: visual, audio or audiovisual
    #[arg(short, long)]
    pub mode: Option<GameMode>,

    /// N-back distance
    #[arg(short, long)]
    pub n_back: Option<usize>,

    /// Number of stimuli per round
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Number of distinct symbols
    #[arg(long)]
    pub symbols: Option<u8>,

    /// Number of matching positions per round
    #[arg(long)]
    pub matches: Option<usize>,

    /// Milliseconds between stimuli
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Seed for reproducible sequences
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RoundArgs {
    /// Applies the flags that were given on top of `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(seed) = self.seed {
            settings.set_seed(seed);
        }
        let game = settings.game_mut();
        let mut updated = game.clone();
        if let Some(mode) = self.mode {
            updated = updated.with_mode(mode);
        }
        if let Some(n_back) = self.n_back {
            updated = updated.with_n_back(n_back);
        }
        if let Some(length) = self.length {
            updated = updated.with_length(length);
        }
        if let Some(symbols) = self.symbols {
            updated = updated.with_symbol_space(symbols);
        }
        if let Some(matches) = self.matches {
            updated = updated.with_match_count(matches);
        }
        if let Some(interval_ms) = self.interval_ms {
            updated = updated.with_tick_interval(Duration::from_millis(interval_ms));
        }
        *game = updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "nback", "play", "--mode", "audio", "-n", "3", "--interval-ms", "500", "--seed", "4",
        ])
        .unwrap();
        let Command::Play(args) = cli.command else {
            panic!("expected play");
        };

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.game().mode(), GameMode::Audio);
        assert_eq!(settings.game().n_back(), 3);
        assert_eq!(settings.game().tick_interval(), Duration::from_millis(500));
        assert_eq!(*settings.seed(), Some(4));
    }

    #[test]
    fn test_global_db_path_after_subcommand() {
        let cli = Cli::try_parse_from(["nback", "highscore", "--db-path", "x.db"]).unwrap();
        assert_eq!(cli.db_path.as_deref(), Some("x.db"));
        assert!(matches!(cli.command, Command::Highscore));
    }
}
