//! Tests for the timed game session.
//!
//! Most tests run on a paused clock: the runtime advances time only when every
//! task is idle, so each tick is observed before the next one fires.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use nback::{
    ConfigError, GameConfig, GameMode, GameSession, GameState, HighscoreError, HighscoreStore,
    MatchOutcome, MemoryHighscoreStore, ScriptedGenerator, SessionError, SilentPlayer,
    SoundPlayer, StimulusSequence,
};

const TICK: Duration = Duration::from_millis(100);

fn config_for(mode: GameMode, n_back: usize, length: usize) -> GameConfig {
    GameConfig::new(mode)
        .with_n_back(n_back)
        .with_length(length)
        .with_match_count(0)
        .with_tick_interval(TICK)
}

fn visual_session(symbols: Vec<u8>, n_back: usize, store: Arc<dyn HighscoreStore>) -> GameSession {
    let config = config_for(GameMode::Visual, n_back, symbols.len());
    GameSession::new(
        config,
        ScriptedGenerator::repeating(symbols),
        store,
        Arc::new(SilentPlayer),
    )
}

async fn wait_for_index(rx: &mut watch::Receiver<GameState>, index: usize) {
    rx.wait_for(|s| s.current_index() == Some(index))
        .await
        .expect("session dropped");
}

/// Collects every presented index until the round goes inactive.
async fn collect_indices(rx: &mut watch::Receiver<GameState>) -> Vec<usize> {
    let mut seen = Vec::new();
    loop {
        rx.changed().await.expect("session dropped");
        let state = rx.borrow_and_update().clone();
        match state.current_index() {
            Some(index) => seen.push(index),
            None if !seen.is_empty() => return seen,
            None => {}
        }
    }
}

/// Sound player recording every cue.
#[derive(Debug, Default)]
struct RecordingPlayer {
    played: Mutex<Vec<u8>>,
    released: AtomicBool,
}

impl SoundPlayer for RecordingPlayer {
    fn play(&self, symbol: u8) {
        self.played.lock().unwrap().push(symbol);
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Store counting writes.
#[derive(Debug)]
struct CountingStore {
    inner: MemoryHighscoreStore,
    saves: AtomicUsize,
}

impl CountingStore {
    fn new(initial: u32) -> Self {
        Self {
            inner: MemoryHighscoreStore::new(initial),
            saves: AtomicUsize::new(0),
        }
    }
}

impl HighscoreStore for CountingStore {
    fn current(&self) -> u32 {
        self.inner.current()
    }

    fn subscribe(&self) -> watch::Receiver<u32> {
        self.inner.subscribe()
    }

    fn save_highscore(&self, value: u32) -> Result<(), HighscoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_highscore(value)
    }

    fn reset(&self) -> Result<(), HighscoreError> {
        self.inner.reset()
    }
}

#[tokio::test(start_paused = true)]
async fn test_index_traverses_whole_sequence_then_goes_inactive() {
    let session = visual_session(vec![1, 2, 3, 4, 5], 2, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();

    session.start().await.expect("start failed");
    assert!(session.is_running());

    let indices = collect_indices(&mut rx).await;
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);

    let summary = session.wait_for_completion().await.expect("no summary");
    assert_eq!(*summary.presented(), 5);
    assert!(!session.is_running());
    assert!(!rx.borrow().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_stimulus_values_follow_sequence() {
    let symbols = vec![4, 0, 8, 4];
    let session = visual_session(symbols.clone(), 1, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    session.start().await.unwrap();

    for (index, value) in symbols.iter().enumerate() {
        wait_for_index(&mut rx, index).await;
        let state = rx.borrow().clone();
        assert_eq!(state.current_value(), Some(*value));
        assert_eq!(state.alternate_style, index % 2 == 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_correct_claim_scores_once() {
    let session = visual_session(
        vec![2, 5, 2, 7, 7, 7],
        2,
        Arc::new(MemoryHighscoreStore::default()),
    );
    let mut rx = session.state();
    let score = session.score();
    session.start().await.unwrap();

    wait_for_index(&mut rx, 2).await;
    assert_eq!(session.check_match(), MatchOutcome::Correct);
    assert_eq!(*score.borrow(), 1);

    assert_eq!(session.check_match(), MatchOutcome::AlreadyClaimed);
    assert_eq!(*score.borrow(), 1);
    assert!(rx.borrow().current_acknowledged());
}

#[tokio::test(start_paused = true)]
async fn test_claims_before_n_back_never_score() {
    let session = visual_session(
        vec![6, 6, 6, 6],
        2,
        Arc::new(MemoryHighscoreStore::default()),
    );
    let mut rx = session.state();
    let score = session.score();
    session.start().await.unwrap();

    for index in 0..2 {
        wait_for_index(&mut rx, index).await;
        assert_eq!(session.check_match(), MatchOutcome::TooEarly);
        assert_eq!(*score.borrow(), 0);
        assert!(rx.borrow().is_acknowledged(index));
    }
}

#[tokio::test(start_paused = true)]
async fn test_wrong_claims_floor_score_at_zero() {
    let session = visual_session(
        vec![3, 1, 4, 3, 1, 4, 3, 1, 9],
        2,
        Arc::new(MemoryHighscoreStore::default()),
    );
    let mut rx = session.state();
    let score = session.score();
    session.start().await.unwrap();

    wait_for_index(&mut rx, 2).await;
    assert_eq!(session.check_match(), MatchOutcome::Incorrect);
    assert_eq!(*score.borrow(), 0);
    assert!(rx.borrow().is_acknowledged(2));

    wait_for_index(&mut rx, 6).await;
    assert_eq!(session.check_match(), MatchOutcome::Incorrect);
    assert_eq!(*score.borrow(), 0);

    let summary = session.wait_for_completion().await.unwrap();
    assert_eq!(*summary.score(), 0);
    assert_eq!(*summary.incorrect(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_claim_after_correct_one_decrements() {
    let session = visual_session(
        vec![2, 5, 2, 7, 7, 7],
        2,
        Arc::new(MemoryHighscoreStore::default()),
    );
    let mut rx = session.state();
    let score = session.score();
    session.start().await.unwrap();

    wait_for_index(&mut rx, 2).await;
    session.check_match();
    wait_for_index(&mut rx, 3).await;
    assert_eq!(session.check_match(), MatchOutcome::Incorrect);
    assert_eq!(*score.borrow(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_check_match_while_idle_is_inactive() {
    let session = visual_session(vec![1, 1, 1], 1, Arc::new(MemoryHighscoreStore::default()));
    assert_eq!(session.check_match(), MatchOutcome::Inactive);

    session.start().await.unwrap();
    session.wait_for_completion().await;
    assert_eq!(session.check_match(), MatchOutcome::Inactive);
    assert!(session.state().borrow().acknowledged.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_mid_round_resets_index_and_score() {
    let first = StimulusSequence::new(vec![2, 5, 2, 7, 7, 7]);
    let second = StimulusSequence::new(vec![8, 0, 8, 1]);
    let config = config_for(GameMode::Visual, 2, 6);
    let session = GameSession::new(
        config,
        ScriptedGenerator::new([first, second]),
        Arc::new(MemoryHighscoreStore::default()),
        Arc::new(SilentPlayer),
    );
    let mut rx = session.state();
    let score = session.score();

    session.start().await.unwrap();
    wait_for_index(&mut rx, 2).await;
    assert_eq!(session.check_match(), MatchOutcome::Correct);
    wait_for_index(&mut rx, 3).await;

    session.start().await.unwrap();
    {
        let state = rx.borrow_and_update();
        assert_eq!(state.current, None);
        assert!(state.acknowledged.is_empty());
    }
    assert_eq!(*score.borrow(), 0);
    assert_eq!(session.sequence_len(), Some(4));

    let indices = collect_indices(&mut rx).await;
    assert_eq!(indices, vec![0, 1, 2, 3]);

    // A second loop would keep publishing after the round ended.
    tokio::time::sleep(TICK * 20).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(session.last_summary().map(|s| *s.presented()), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_completion_starts_fresh() {
    let session = visual_session(vec![2, 5, 2], 2, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();

    session.start().await.unwrap();
    wait_for_index(&mut rx, 2).await;
    session.check_match();
    session.wait_for_completion().await;

    session.start().await.unwrap();
    assert_eq!(*session.score().borrow(), 0);
    let indices = collect_indices(&mut rx).await;
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_highscore_saved_when_beaten() {
    let store = Arc::new(MemoryHighscoreStore::new(1));
    let session = visual_session(vec![2, 5, 2, 7, 7, 7], 2, store.clone());
    let mut rx = session.state();
    session.start().await.unwrap();

    wait_for_index(&mut rx, 2).await;
    session.check_match();
    wait_for_index(&mut rx, 5).await;
    session.check_match();

    let summary = session.wait_for_completion().await.unwrap();
    assert_eq!(*summary.score(), 2);
    assert_eq!(store.current(), 2);

    let mut highscore = session.highscore();
    highscore.wait_for(|&h| h == 2).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_highscore_not_saved_when_tied_or_lower() {
    let store = Arc::new(CountingStore::new(1));
    let session = visual_session(vec![2, 5, 2, 7], 2, store.clone());
    let mut rx = session.state();

    // Ties the highscore.
    session.start().await.unwrap();
    wait_for_index(&mut rx, 2).await;
    session.check_match();
    session.wait_for_completion().await;
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);

    // Scores nothing.
    session.start().await.unwrap();
    session.wait_for_completion().await;
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    assert_eq!(store.current(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_round_does_not_touch_highscore() {
    let store = Arc::new(CountingStore::new(0));
    let session = visual_session(vec![2, 5, 2, 7, 7, 7], 2, store.clone());
    let mut rx = session.state();

    session.start().await.unwrap();
    wait_for_index(&mut rx, 2).await;
    session.check_match();
    session.stop().await;

    assert!(!session.is_running());
    assert!(!rx.borrow().is_active());
    assert_eq!(session.last_summary(), None);

    tokio::time::sleep(TICK * 20).await;
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_audiovisual_mode_is_rejected() {
    let session = visual_session(vec![1, 2, 3], 1, Arc::new(MemoryHighscoreStore::default()));
    session.set_mode(GameMode::AudioVisual);

    let err = session.start().await.unwrap_err();
    assert_eq!(err, SessionError::UnsupportedMode(GameMode::AudioVisual));
    assert!(!session.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_config_is_rejected_without_disturbing_round() {
    let session = visual_session(vec![1, 2, 3, 4], 1, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    session.start().await.unwrap();
    wait_for_index(&mut rx, 1).await;

    session.set_n_back(4);
    let err = session.start().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::InvalidConfig(ConfigError::NBackTooLarge {
            n_back: 4,
            length: 4
        })
    );

    assert!(session.is_running());
    wait_for_index(&mut rx, 2).await;
}

#[tokio::test(start_paused = true)]
async fn test_set_mode_while_running_applies_to_next_round() {
    let session = visual_session(vec![1, 2, 3], 1, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    session.start().await.unwrap();
    wait_for_index(&mut rx, 0).await;

    session.set_mode(GameMode::Audio);
    assert_eq!(rx.borrow().mode, GameMode::Visual);
    assert_eq!(session.config().mode(), GameMode::Audio);

    session.wait_for_completion().await;
    session.start().await.unwrap();
    assert_eq!(rx.borrow().mode, GameMode::Audio);
}

#[tokio::test(start_paused = true)]
async fn test_audio_mode_plays_each_stimulus() {
    let player = Arc::new(RecordingPlayer::default());
    let symbols = vec![0, 3, 0, 8];
    let session = GameSession::new(
        config_for(GameMode::Audio, 2, symbols.len()),
        ScriptedGenerator::repeating(symbols.clone()),
        Arc::new(MemoryHighscoreStore::default()),
        player.clone(),
    );

    session.start().await.unwrap();
    session.wait_for_completion().await;
    assert_eq!(*player.played.lock().unwrap(), symbols);

    session.shutdown().await;
    assert!(player.released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_visual_mode_plays_no_sound() {
    let player = Arc::new(RecordingPlayer::default());
    let session = GameSession::new(
        config_for(GameMode::Visual, 1, 3),
        ScriptedGenerator::repeating(vec![1, 1, 2]),
        Arc::new(MemoryHighscoreStore::default()),
        player.clone(),
    );

    session.start().await.unwrap();
    session.wait_for_completion().await;
    assert!(player.played.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_interval() {
    let session = visual_session(vec![1, 2, 3], 1, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    let begin = tokio::time::Instant::now();

    session.start().await.unwrap();
    wait_for_index(&mut rx, 0).await;
    assert_eq!(begin.elapsed(), Duration::ZERO);
    wait_for_index(&mut rx, 2).await;
    assert_eq!(begin.elapsed(), TICK * 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_releases_pending_completion_waiters() {
    let session = visual_session(vec![2, 5, 2, 7, 7, 7], 2, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    session.start().await.unwrap();

    let stopper = async {
        wait_for_index(&mut rx, 2).await;
        session.stop().await;
    };
    let (summary, ()) = tokio::time::timeout(Duration::from_secs(3600), async {
        tokio::join!(session.wait_for_completion(), stopper)
    })
    .await
    .expect("waiter still pending after stop");

    assert_eq!(summary, None);
    assert_eq!(session.last_summary(), None);
}

#[tokio::test(start_paused = true)]
async fn test_idle_stop_keeps_summary_and_abandon_clears_it() {
    let session = visual_session(vec![1, 2, 3], 1, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();

    session.start().await.unwrap();
    assert!(session.wait_for_completion().await.is_some());

    // Idle stop keeps the finished round's summary.
    session.stop().await;
    assert!(session.last_summary().is_some());

    session.start().await.unwrap();
    wait_for_index(&mut rx, 0).await;
    session.stop().await;
    assert_eq!(session.last_summary(), None);
    assert_eq!(session.wait_for_completion().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_set_config_while_idle_publishes_mode() {
    let session = visual_session(vec![1, 2, 3], 1, Arc::new(MemoryHighscoreStore::default()));
    let state = session.state();

    session.set_config(config_for(GameMode::Audio, 2, 3));
    assert_eq!(state.borrow().mode, GameMode::Audio);
    assert_eq!(session.config().n_back(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_set_config_while_running_applies_to_next_round() {
    let session = visual_session(vec![4, 4, 1, 4], 2, Arc::new(MemoryHighscoreStore::default()));
    let mut rx = session.state();
    session.start().await.unwrap();
    wait_for_index(&mut rx, 1).await;

    session.set_config(config_for(GameMode::Audio, 1, 4));
    assert_eq!(rx.borrow().mode, GameMode::Visual);
    // Still scored against N = 2.
    assert_eq!(session.check_match(), MatchOutcome::TooEarly);

    session.wait_for_completion().await;
    session.start().await.unwrap();
    assert_eq!(rx.borrow_and_update().mode, GameMode::Audio);
    wait_for_index(&mut rx, 1).await;
    assert_eq!(session.check_match(), MatchOutcome::Correct);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_racing_start_and_stop_never_strands_a_round() {
    let config = config_for(GameMode::Visual, 1, 3).with_tick_interval(Duration::from_millis(1));
    let session = Arc::new(GameSession::new(
        config,
        ScriptedGenerator::repeating(vec![1, 2, 3]),
        Arc::new(MemoryHighscoreStore::default()),
        Arc::new(SilentPlayer),
    ));

    let starter = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            for _ in 0..100 {
                session.start().await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    for _ in 0..100 {
        session.stop().await;
        tokio::task::yield_now().await;
    }
    starter.await.unwrap();

    // A running round must still have a loop driving it to completion.
    if session.is_running() {
        tokio::time::timeout(Duration::from_secs(5), session.wait_for_completion())
            .await
            .expect("running round has no loop");
    }
    assert!(!session.is_running());
}
