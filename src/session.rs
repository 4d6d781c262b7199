//! Game session: drives rounds from a timed loop and publishes observable state.
//!
//! A session owns at most one running loop. Starting a new round cancels the
//! previous loop and waits for it to stop. Every loop mutation also checks the
//! run generation under the session lock, so a loop that outlives its
//! cancellation can never touch a newer round.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use derive_more::{Display, Error, From};
use nback_core::{
    ConfigError, GameConfig, GameMode, GameState, MatchOutcome, Round, RoundSummary,
    SequenceGenerator, SequenceParams,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::audio::SoundPlayer;
use crate::highscore::HighscoreStore;

/// Reason a round could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The configured parameters cannot produce a round.
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(ConfigError),

    /// The configured mode has no playable implementation.
    #[display("Mode '{}' is not playable yet", _0)]
    #[from(ignore)]
    UnsupportedMode(#[error(not(source))] GameMode),
}

/// End of a run. `summary` is `None` when the round was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Completed {
    generation: u64,
    summary: Option<RoundSummary>,
}

/// Mutable session data guarded by one lock.
struct Slot {
    config: GameConfig,
    generation: u64,
    round: Option<Round>,
    run: Option<JoinHandle<()>>,
    generator: Box<dyn SequenceGenerator>,
}

impl Slot {
    fn is_running(&self) -> bool {
        self.round.as_ref().is_some_and(|r| !r.is_finished())
    }
}

/// State shared between the session handle and its tasks.
struct Shared {
    slot: Mutex<Slot>,
    state_tx: watch::Sender<GameState>,
    score_tx: watch::Sender<u32>,
    highscore_tx: watch::Sender<u32>,
    completed_tx: watch::Sender<Option<Completed>>,
    store: Arc<dyn HighscoreStore>,
    sounds: Arc<dyn SoundPlayer>,
}

impl Shared {
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, round: &Round) {
        self.state_tx.send_replace(round.state().clone());
        let score = round.score();
        self.score_tx.send_if_modified(|current| {
            let changed = *current != score;
            *current = score;
            changed
        });
    }
}

/// Host for N-back rounds.
///
/// Must be created inside a Tokio runtime: the highscore mirror and the
/// timed loop run as spawned tasks.
pub struct GameSession {
    shared: Arc<Shared>,
    mirror: JoinHandle<()>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.shared.lock_slot();
        f.debug_struct("GameSession")
            .field("config", &slot.config)
            .field("generation", &slot.generation)
            .field("running", &slot.is_running())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Creates an idle session.
    #[instrument(skip(generator, store, sounds))]
    pub fn new(
        config: GameConfig,
        generator: impl SequenceGenerator + 'static,
        store: Arc<dyn HighscoreStore>,
        sounds: Arc<dyn SoundPlayer>,
    ) -> Self {
        let (state_tx, _) = watch::channel(GameState::idle(config.mode()));
        let (score_tx, _) = watch::channel(0);
        let (highscore_tx, _) = watch::channel(store.current());
        let (completed_tx, _) = watch::channel(None);

        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                config,
                generation: 0,
                round: None,
                run: None,
                generator: Box::new(generator),
            }),
            state_tx,
            score_tx,
            highscore_tx,
            completed_tx,
            store,
            sounds,
        });

        let mirror = tokio::spawn(mirror_highscore(Arc::clone(&shared)));
        info!("Game session created");

        Self { shared, mirror }
    }

    /// Starts a new round, cancelling any round in progress.
    ///
    /// The previous loop has fully stopped before this returns. Score resets
    /// to zero and a fresh sequence is generated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the configuration is invalid or the mode is
    /// not playable. A running round is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let slot = self.shared.lock_slot();
            slot.config.validate()?;
            if !slot.config.mode().is_playable() {
                warn!(mode = %slot.config.mode(), "Refusing to start unplayable mode");
                return Err(SessionError::UnsupportedMode(slot.config.mode()));
            }
        }

        let previous = self.shared.lock_slot().run.take();
        if let Some(handle) = previous {
            cancel_loop(handle).await;
        }

        {
            let mut slot = self.shared.lock_slot();
            slot.generation += 1;
            let params = SequenceParams::from(&slot.config);
            let sequence = slot.generator.generate(&params);
            let round = Round::new(slot.config.mode(), slot.config.n_back(), sequence);
            self.shared.publish(&round);
            info!(
                generation = slot.generation,
                mode = %slot.config.mode(),
                n_back = slot.config.n_back(),
                symbols = ?round.sequence().symbols(),
                "Round started"
            );
            slot.round = Some(round);

            let handle = tokio::spawn(run_loop(
                Arc::clone(&self.shared),
                slot.generation,
                slot.config.tick_interval(),
            ));
            // A concurrent start may have stored its loop meanwhile. Its
            // generation is already stale.
            if let Some(stray) = slot.run.replace(handle) {
                stray.abort();
            }
        }
        Ok(())
    }

    /// Claims that the current stimulus matches the one N steps back.
    #[instrument(skip(self))]
    pub fn check_match(&self) -> MatchOutcome {
        let mut slot = self.shared.lock_slot();
        let Some(round) = slot.round.as_mut() else {
            return MatchOutcome::Inactive;
        };
        let outcome = round.check_match();
        if outcome.is_recorded() {
            self.shared.publish(round);
        }
        outcome
    }

    /// Sets the mode used by the next [`GameSession::start`].
    #[instrument(skip(self))]
    pub fn set_mode(&self, mode: GameMode) {
        let mut slot = self.shared.lock_slot();
        slot.config.set_mode(mode);
        if !slot.is_running() {
            self.shared.state_tx.send_modify(|state| state.mode = mode);
        }
        debug!("Mode updated for next round");
    }

    /// Sets the N-back distance used by the next [`GameSession::start`].
    #[instrument(skip(self))]
    pub fn set_n_back(&self, n_back: usize) {
        self.shared.lock_slot().config.set_n_back(n_back);
    }

    /// Replaces the whole configuration for the next [`GameSession::start`].
    #[instrument(skip(self))]
    pub fn set_config(&self, config: GameConfig) {
        let mut slot = self.shared.lock_slot();
        let mode = config.mode();
        slot.config = config;
        if !slot.is_running() {
            self.shared.state_tx.send_modify(|state| state.mode = mode);
        }
    }

    /// Configuration for the next round.
    pub fn config(&self) -> GameConfig {
        self.shared.lock_slot().config.clone()
    }

    /// Whether a round is currently being played.
    pub fn is_running(&self) -> bool {
        self.shared.lock_slot().is_running()
    }

    /// Length of the current or last round's sequence.
    pub fn sequence_len(&self) -> Option<usize> {
        self.shared
            .lock_slot()
            .round
            .as_ref()
            .map(|r| r.sequence().len())
    }

    /// Subscribes to round state snapshots.
    pub fn state(&self) -> watch::Receiver<GameState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribes to the score.
    pub fn score(&self) -> watch::Receiver<u32> {
        self.shared.score_tx.subscribe()
    }

    /// Subscribes to the mirrored highscore.
    pub fn highscore(&self) -> watch::Receiver<u32> {
        self.shared.highscore_tx.subscribe()
    }

    /// Summary of the most recently ended round.
    ///
    /// `None` if no round has ended yet or the last one was abandoned.
    pub fn last_summary(&self) -> Option<RoundSummary> {
        let completed = *self.shared.completed_tx.borrow();
        completed.and_then(|c| c.summary)
    }

    /// Waits until the current round ends and returns its summary.
    ///
    /// Returns immediately with the last summary if no round is running. If
    /// the round is replaced by a restart, waits for the replacement instead.
    /// Returns `None` if the round is abandoned with [`GameSession::stop`].
    #[instrument(skip(self))]
    pub async fn wait_for_completion(&self) -> Option<RoundSummary> {
        let mut rx = self.shared.completed_tx.subscribe();
        let generation = {
            let slot = self.shared.lock_slot();
            if !slot.is_running() {
                return self.last_summary();
            }
            slot.generation
        };
        let completed = *rx
            .wait_for(|c| matches!(c, Some(done) if done.generation >= generation))
            .await
            .ok()?;
        completed.and_then(|c| c.summary)
    }

    /// Abandons the running round without scoring it.
    ///
    /// The highscore is untouched, [`GameSession::last_summary`] becomes
    /// `None` and pending [`GameSession::wait_for_completion`] calls return
    /// `None`. No-op when idle.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let previous = {
            let mut slot = self.shared.lock_slot();
            if slot.is_running() {
                slot.generation += 1;
                slot.round = None;
                self.shared.state_tx.send_modify(|state| state.current = None);
                self.shared.completed_tx.send_replace(Some(Completed {
                    generation: slot.generation,
                    summary: None,
                }));
                info!(generation = slot.generation, "Round abandoned");
            }
            slot.run.take()
        };

        if let Some(handle) = previous {
            cancel_loop(handle).await;
        }
    }

    /// Stops any running round and releases the sound player.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        self.stop().await;
        self.mirror.abort();
        self.shared.sounds.release();
        info!("Game session shut down");
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        if let Some(handle) = self.shared.lock_slot().run.take() {
            handle.abort();
        }
        self.mirror.abort();
    }
}

/// Presents one stimulus per tick until the sequence is exhausted.
#[instrument(skip(shared, interval))]
async fn run_loop(shared: Arc<Shared>, generation: u64, interval: std::time::Duration) {
    let mut index = 0;
    loop {
        let presented = {
            let mut slot = shared.lock_slot();
            if slot.generation != generation {
                debug!("Stale loop stopping before tick");
                return;
            }
            let Some(round) = slot.round.as_mut() else {
                return;
            };
            let stimulus = round.present(index);
            if stimulus.is_some() {
                shared.publish(round);
            }
            stimulus.map(|s| (s, round.state().mode))
        };

        let Some((stimulus, mode)) = presented else {
            break;
        };
        if mode.plays_audio() {
            shared.sounds.play(stimulus.value);
        }

        sleep(interval).await;
        index += 1;
    }

    complete_round(&shared, generation);
}

/// Ends the round and persists a new highscore if it was beaten.
#[instrument(skip(shared))]
fn complete_round(shared: &Shared, generation: u64) {
    let summary = {
        let mut slot = shared.lock_slot();
        if slot.generation != generation {
            debug!("Stale loop stopping before completion");
            return;
        }
        let Some(round) = slot.round.as_mut() else {
            return;
        };
        let summary = round.finish();
        shared.publish(round);
        summary
    };

    info!(
        score = summary.score(),
        correct = summary.correct(),
        incorrect = summary.incorrect(),
        missed = summary.missed(),
        "Round finished"
    );

    let best = shared.store.current();
    let score = *summary.score();
    if score > best {
        match shared.store.save_highscore(score) {
            Ok(()) => info!(previous = best, highscore = score, "New highscore"),
            Err(e) => warn!(error = %e, "Failed to persist highscore"),
        }
    }

    shared.completed_tx.send_replace(Some(Completed {
        generation,
        summary: Some(summary),
    }));
}

/// Aborts a loop task and waits for it to stop.
async fn cancel_loop(handle: JoinHandle<()>) {
    handle.abort();
    match handle.await {
        Ok(()) => debug!("Loop had already finished"),
        Err(e) if e.is_cancelled() => debug!("Loop cancelled"),
        Err(e) => warn!(error = %e, "Loop ended abnormally"),
    }
}

/// Forwards store highscore changes into the session's observable value.
async fn mirror_highscore(shared: Arc<Shared>) {
    let mut rx = shared.store.subscribe();
    let initial = *rx.borrow_and_update();
    shared.highscore_tx.send_replace(initial);
    while rx.changed().await.is_ok() {
        let value = *rx.borrow_and_update();
        debug!(highscore = value, "Highscore mirrored");
        shared.highscore_tx.send_replace(value);
    }
}
