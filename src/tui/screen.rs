//! Screen trait and transition type for the terminal UI state machine.

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::GameSession;

/// The result of handling an input event on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTransition {
    /// Stay on the current screen.
    Stay,
    /// Return to the home screen, abandoning any round in progress.
    GoToHome,
    /// Start a new round and show the game screen.
    StartGame,
    /// Exit the application.
    Quit,
}

/// Trait implemented by each screen.
///
/// Screens read observable state from the session when rendering and issue
/// synchronous commands from key handlers. Anything async is expressed as a
/// transition and run by the controller.
pub trait Screen {
    /// Renders the screen into the provided [`Frame`].
    fn render(&self, frame: &mut Frame, session: &GameSession);

    /// Handles a key event and returns the resulting [`ScreenTransition`].
    fn handle_key(&mut self, key: KeyEvent, session: &GameSession) -> ScreenTransition;
}
