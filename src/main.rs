//! N-back trainer - unified CLI
//!
//! Plays rounds in the terminal and manages the stored highscore.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, RoundArgs};
use nback::{
    GameSession, HighscoreRepository, HighscoreStore, SeededGenerator, SequenceGenerator,
    SequenceParams, Settings, SqliteHighscoreStore, TerminalBell,
};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(&cli.config)?;
    if let Some(db_path) = &cli.db_path {
        settings.set_database(db_path.clone());
    }

    match cli.command {
        Command::Play(args) => run_play(settings, args).await,
        Command::Highscore => show_highscore(settings),
        Command::ResetHighscore => reset_highscore(settings),
        Command::Sequence(args) => print_sequence(settings, args),
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Logs to a file so output does not interfere with the TUI.
fn init_file_tracing(path: &str) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized
    Ok(())
}

/// Run the terminal game
async fn run_play(mut settings: Settings, args: RoundArgs) -> Result<()> {
    args.apply(&mut settings);
    init_file_tracing(settings.log_file())?;
    info!(database = %settings.database(), "Starting N-back");

    let store = SqliteHighscoreStore::open(settings.database())?;
    let generator = match settings.seed() {
        Some(seed) => SeededGenerator::new(*seed),
        None => SeededGenerator::from_entropy(),
    };
    debug!(seed = generator.seed(), "Sequence generator ready");

    let session = GameSession::new(
        settings.game().clone(),
        generator,
        Arc::new(store),
        Arc::new(TerminalBell::new()),
    );
    nback::run_tui(session).await
}

/// Print the stored highscore
#[instrument(skip(settings))]
fn show_highscore(settings: Settings) -> Result<()> {
    init_stderr_tracing();
    let store = SqliteHighscoreStore::open(settings.database())?;
    println!("{}", store.current());
    Ok(())
}

/// Clear the stored highscore
#[instrument(skip(settings))]
fn reset_highscore(settings: Settings) -> Result<()> {
    init_stderr_tracing();
    let repository = HighscoreRepository::open(settings.database().clone())?;
    repository.reset()?;
    println!("Highscore reset in {}", repository.db_path());
    Ok(())
}

/// Generate one sequence and print it as JSON
#[instrument(skip(settings, args))]
fn print_sequence(mut settings: Settings, args: RoundArgs) -> Result<()> {
    init_stderr_tracing();
    args.apply(&mut settings);
    settings.game().validate()?;

    let mut generator = match settings.seed() {
        Some(seed) => SeededGenerator::new(*seed),
        None => SeededGenerator::from_entropy(),
    };
    let params = SequenceParams::from(settings.game());
    let sequence = generator.generate(&params);

    let match_positions: Vec<usize> = sequence
        .stimuli()
        .filter(|s| sequence.is_match(s.index, params.n_back))
        .map(|s| s.index)
        .collect();

    let output = serde_json::json!({
        "seed": generator.seed(),
        "n_back": params.n_back,
        "matches": match_positions,
        "symbols": sequence,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
