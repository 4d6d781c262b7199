//! Controller: the state machine driving the terminal UI.

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::Backend};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, instrument, warn};

use crate::GameSession;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::screens::{GameScreen, HomeScreen};

/// Active screen in the state machine.
#[derive(Debug)]
enum ActiveScreen {
    Home(HomeScreen),
    Game(GameScreen),
}

impl ActiveScreen {
    fn as_screen(&self) -> &dyn Screen {
        match self {
            Self::Home(s) => s,
            Self::Game(s) => s,
        }
    }

    fn as_screen_mut(&mut self) -> &mut dyn Screen {
        match self {
            Self::Home(s) => s,
            Self::Game(s) => s,
        }
    }
}

/// Controller that owns the session and drives screen transitions.
#[derive(Debug)]
pub struct Controller {
    session: GameSession,
}

impl Controller {
    /// Creates a controller for `session`.
    #[instrument(skip(session))]
    pub fn new(session: GameSession) -> Self {
        info!("Creating Controller");
        Self { session }
    }

    /// Consumes the controller, returning the session.
    pub fn into_session(self) -> GameSession {
        self.session
    }

    /// Runs the event loop until the user quits.
    ///
    /// Redraws every pass so stimuli published by the timed loop show up
    /// without a key press.
    #[instrument(skip(self, terminal))]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        info!("Starting UI event loop");
        let mut screen = ActiveScreen::Home(HomeScreen::new(&self.session));

        loop {
            terminal.draw(|f| screen.as_screen().render(f, &self.session))?;

            // Poll for input with short timeout to keep the loop responsive.
            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
            {
                // Skip key release events (crossterm fires both press and release).
                if key.kind == KeyEventKind::Release {
                    continue;
                }

                let transition = screen.as_screen_mut().handle_key(key, &self.session);
                screen = match self.apply_transition(transition, screen).await {
                    Some(next) => next,
                    None => {
                        info!("UI quitting");
                        return Ok(());
                    }
                };
            }

            sleep(Duration::from_millis(10)).await;
        }
    }

    /// Applies a screen transition, returning the next screen or `None` to quit.
    #[instrument(skip(self, current))]
    async fn apply_transition(
        &mut self,
        transition: ScreenTransition,
        current: ActiveScreen,
    ) -> Option<ActiveScreen> {
        if transition != ScreenTransition::Stay {
            debug!(transition = ?transition, "Applying screen transition");
        }
        match transition {
            ScreenTransition::Stay => Some(current),

            ScreenTransition::GoToHome => {
                self.session.stop().await;
                info!("Navigating to Home");
                Some(ActiveScreen::Home(HomeScreen::new(&self.session)))
            }

            ScreenTransition::StartGame => match self.session.start().await {
                Ok(()) => {
                    info!("Navigating to Game");
                    Some(ActiveScreen::Game(GameScreen::new(&self.session)))
                }
                Err(e) => {
                    warn!(error = %e, "Round could not start");
                    let mut home = HomeScreen::new(&self.session);
                    home.set_error(e.to_string());
                    Some(ActiveScreen::Home(home))
                }
            },

            ScreenTransition::Quit => {
                self.session.stop().await;
                None
            }
        }
    }
}
