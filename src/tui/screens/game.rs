//! Game screen: the stimulus grid, score and match input.

use crossterm::event::{KeyCode, KeyEvent};
use nback_core::{GameState, MatchOutcome, RoundSummary};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::GameSession;
use crate::tui::layout::center_rect;
use crate::tui::screen::{Screen, ScreenTransition};

/// Grid side length. Symbol `v` lights cell `(v / 3, v % 3)`.
const GRID_SIDE: u16 = 3;
const CELL_WIDTH: u16 = 9;
const CELL_HEIGHT: u16 = 4;

/// State for the game screen.
#[derive(Debug)]
pub struct GameScreen {
    state: watch::Receiver<GameState>,
    score: watch::Receiver<u32>,
    n_back: usize,
    total: usize,
    last_outcome: Option<MatchOutcome>,
}

impl GameScreen {
    /// Creates a game screen for the round the session just started.
    #[instrument(skip(session))]
    pub fn new(session: &GameSession) -> Self {
        let n_back = session.config().n_back();
        let total = session.sequence_len().unwrap_or_default();
        debug!(n_back, total, "Initializing GameScreen");
        Self {
            state: session.state(),
            score: session.score(),
            n_back,
            total,
            last_outcome: None,
        }
    }

    fn outcome_line(&self) -> Line<'static> {
        let (text, color) = match self.last_outcome {
            Some(MatchOutcome::Correct) => ("Match!", Color::Green),
            Some(MatchOutcome::Incorrect) => ("No match", Color::Red),
            Some(MatchOutcome::AlreadyClaimed) => ("Already claimed", Color::DarkGray),
            Some(MatchOutcome::TooEarly) => ("Too early to match", Color::DarkGray),
            Some(MatchOutcome::Inactive) | None => ("", Color::Reset),
        };
        Line::styled(text, Style::default().fg(color))
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &GameState) {
        let event = match state.current_index() {
            Some(index) => format!("Event {}/{}", index + 1, self.total),
            None => format!("Event -/{}", self.total),
        };
        let header = Paragraph::new(format!(
            "Score: {}   N-back: {}   {}",
            *self.score.borrow(),
            self.n_back,
            event
        ))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_grid(frame: &mut Frame, area: Rect, state: &GameState) {
        let grid = center_rect(area, CELL_WIDTH * GRID_SIDE, CELL_HEIGHT * GRID_SIDE);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(CELL_HEIGHT); GRID_SIDE as usize])
            .split(grid);

        let highlight = if state.alternate_style {
            Color::Magenta
        } else {
            Color::Blue
        };
        let lit = state.current_value().map(u16::from);

        for (row, row_area) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(CELL_WIDTH); GRID_SIDE as usize])
                .split(*row_area);
            for (col, cell_area) in cells.iter().enumerate() {
                let position = row as u16 * GRID_SIDE + col as u16;
                let mut block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                if lit == Some(position) {
                    block = block.style(Style::default().bg(highlight));
                    if state.current_acknowledged() {
                        block = block.border_style(Style::default().fg(Color::Green));
                    }
                }
                frame.render_widget(block, *cell_area);
            }
        }
    }

    fn render_audio(frame: &mut Frame, area: Rect, state: &GameState) {
        let color = if state.current_acknowledged() {
            Color::Green
        } else {
            Color::Yellow
        };
        let prompt = Paragraph::new("Listen to the sounds")
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(prompt, center_rect(area, 30, 1));
    }

    fn render_summary(frame: &mut Frame, area: Rect, summary: Option<RoundSummary>) {
        let lines = match summary {
            Some(summary) => vec![
                Line::from("Round over"),
                Line::from(""),
                Line::from(format!("Score: {}", summary.score())),
                Line::from(format!(
                    "Correct: {}   Incorrect: {}   Missed: {}",
                    summary.correct(),
                    summary.incorrect(),
                    summary.missed()
                )),
            ],
            None => vec![Line::from("Round stopped")],
        };
        let body = Paragraph::new(lines)
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        frame.render_widget(body, center_rect(area, 48, 4));
    }
}

impl Screen for GameScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &GameSession) {
        let state = self.state.borrow().clone();
        let running = session.is_running();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(CELL_HEIGHT * GRID_SIDE),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], &state);

        if !running {
            Self::render_summary(frame, chunks[1], session.last_summary());
        } else if state.mode.shows_grid() {
            Self::render_grid(frame, chunks[1], &state);
        } else {
            Self::render_audio(frame, chunks[1], &state);
        }

        frame.render_widget(
            Paragraph::new(self.outcome_line()).alignment(Alignment::Center),
            chunks[2],
        );

        let help = if running {
            "Space: MATCH | Esc: Back to Home | q: Quit"
        } else {
            "Enter: Play again | Esc: Back to Home | q: Quit"
        };
        let help = Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[3]);
    }

    #[instrument(skip(self, key, session))]
    fn handle_key(&mut self, key: KeyEvent, session: &GameSession) -> ScreenTransition {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('m') | KeyCode::Char('M') => {
                let outcome = session.check_match();
                debug!(outcome = ?outcome, "Match claimed");
                self.last_outcome = Some(outcome);
                ScreenTransition::Stay
            }
            KeyCode::Enter if !session.is_running() => ScreenTransition::StartGame,
            KeyCode::Esc => ScreenTransition::GoToHome,
            KeyCode::Char('q') | KeyCode::Char('Q') => ScreenTransition::Quit,
            _ => ScreenTransition::Stay,
        }
    }
}
