//! Home screen: mode selection, N-back distance and the highscore.

use crossterm::event::{KeyCode, KeyEvent};
use nback_core::GameMode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::GameSession;
use crate::tui::screen::{Screen, ScreenTransition};

/// Modes offered on the home screen, in display order.
const MODES: [GameMode; 2] = [GameMode::Audio, GameMode::Visual];

/// State for the home screen.
#[derive(Debug)]
pub struct HomeScreen {
    highscore: watch::Receiver<u32>,
    error: Option<String>,
}

impl HomeScreen {
    /// Creates a home screen bound to the session's highscore.
    #[instrument(skip(session))]
    pub fn new(session: &GameSession) -> Self {
        debug!("Initializing HomeScreen");
        Self {
            highscore: session.highscore(),
            error: None,
        }
    }

    /// Shows an error line until the next key press.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    fn mode_line(selected: GameMode) -> Line<'static> {
        let mut spans = Vec::new();
        for mode in MODES {
            let style = if mode == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ", mode.label()), style));
            spans.push(Span::raw("   "));
        }
        spans.pop();
        Line::from(spans)
    }
}

impl Screen for HomeScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &GameSession) {
        let config = session.config();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(7),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let title = Paragraph::new("N-Back")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let highscore = Paragraph::new(format!("Highscore: {}", *self.highscore.borrow()))
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(highscore, chunks[1]);

        let mut lines = vec![
            Line::from(""),
            Self::mode_line(config.mode()),
            Line::from(""),
            Line::from(format!("N-back: {}", config.n_back())),
            Line::from(format!(
                "Events: {}   Matches: {}   Interval: {:.1}s",
                config.length(),
                config.match_count(),
                config.tick_interval().as_secs_f32()
            )),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Game"));
        frame.render_widget(body, chunks[2]);

        let help = Paragraph::new("←→/a/v: Mode | +/-: N-back | Enter: Start | q: Quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[3]);
    }

    #[instrument(skip(self, key, session))]
    fn handle_key(&mut self, key: KeyEvent, session: &GameSession) -> ScreenTransition {
        self.error = None;
        let config = session.config();
        match key.code {
            KeyCode::Char('a') | KeyCode::Char('A') => {
                session.set_mode(GameMode::Audio);
                ScreenTransition::Stay
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                session.set_mode(GameMode::Visual);
                ScreenTransition::Stay
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                let next = match config.mode() {
                    GameMode::Audio => GameMode::Visual,
                    _ => GameMode::Audio,
                };
                session.set_mode(next);
                ScreenTransition::Stay
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                session.set_n_back(config.n_back() + 1);
                ScreenTransition::Stay
            }
            KeyCode::Char('-') | KeyCode::Down => {
                session.set_n_back(config.n_back().saturating_sub(1).max(1));
                ScreenTransition::Stay
            }
            KeyCode::Enter => {
                info!(mode = %config.mode(), n_back = config.n_back(), "Start requested");
                ScreenTransition::StartGame
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ScreenTransition::Quit,
            _ => ScreenTransition::Stay,
        }
    }
}
