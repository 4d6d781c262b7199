//! Audio playback collaborators.
//!
//! The session only ever asks for "play the cue for symbol N" and never
//! waits on the result. Which sound that is and how it reaches the speaker
//! is up to the player.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument, warn};

/// Maps symbol codes to the spoken letters used as audio cues.
///
/// Symbol 0 is `A`, symbol 8 is `I`; the default nine-symbol space covers
/// `A` through `I`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundBank;

impl SoundBank {
    /// Letter cue for `symbol`, or `None` past `Z`.
    pub fn letter(symbol: u8) -> Option<char> {
        (symbol < 26).then(|| char::from(b'A' + symbol))
    }
}

/// Fire-and-forget sound output.
pub trait SoundPlayer: Send + Sync + std::fmt::Debug {
    /// Plays the cue associated with `symbol`.
    fn play(&self, symbol: u8);

    /// Releases any playback resources. Later `play` calls become no-ops.
    fn release(&self) {}
}

/// Player that discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&self, symbol: u8) {
        debug!(symbol, "Silent cue");
    }
}

/// Rings the terminal bell for each cue.
///
/// Terminals cannot speak letters, so the bell only marks the moment a cue
/// would play; the letter itself is logged.
#[derive(Debug, Default)]
pub struct TerminalBell {
    released: AtomicBool,
}

impl TerminalBell {
    /// Creates a bell player.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundPlayer for TerminalBell {
    fn play(&self, symbol: u8) {
        if self.released.load(Ordering::Acquire) {
            return;
        }
        debug!(symbol, letter = ?SoundBank::letter(symbol), "Ringing bell");
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            warn!(error = %e, "Failed to ring terminal bell");
        }
    }

    #[instrument(skip(self))]
    fn release(&self) {
        self.released.store(true, Ordering::Release);
        debug!("Terminal bell released");
    }
}
