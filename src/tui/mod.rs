//! Terminal UI for the N-back trainer.

mod controller;
mod layout;
mod screen;
mod screens;

use std::io;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument};

use crate::GameSession;

pub use controller::Controller;
pub use screen::{Screen, ScreenTransition};

/// Runs the terminal UI until the player quits, then shuts the session down.
///
/// Logging must already be directed away from stdout.
#[instrument(skip(session))]
pub async fn run_tui(session: GameSession) -> Result<()> {
    info!("Starting N-back TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut controller = Controller::new(session);
    let res = controller.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.into_session().shutdown().await;

    if let Err(err) = &res {
        error!(error = ?err, "UI loop error");
    }
    res
}
