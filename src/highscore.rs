//! Highscore persistence collaborators.
//!
//! A store holds a single non-negative integer and broadcasts every change
//! on a watch channel, so presentation layers can mirror it reactively.

use std::sync::Mutex;

use derive_more::{Display, Error, From};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::db::{DbError, HighscoreRepository};

/// Durable store for the best score across sessions.
pub trait HighscoreStore: Send + Sync + std::fmt::Debug {
    /// Latest known highscore.
    fn current(&self) -> u32;

    /// Subscribes to highscore changes.
    fn subscribe(&self) -> watch::Receiver<u32>;

    /// Persists a new highscore and notifies subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`HighscoreError`] if the value could not be written.
    fn save_highscore(&self, value: u32) -> Result<(), HighscoreError>;

    /// Clears the highscore back to zero.
    ///
    /// # Errors
    ///
    /// Returns [`HighscoreError`] if the value could not be cleared.
    fn reset(&self) -> Result<(), HighscoreError>;
}

/// Failure to read or write the highscore.
#[derive(Debug, Clone, Display, Error, From)]
pub enum HighscoreError {
    /// Backing database failed.
    #[display("{}", _0)]
    Database(DbError),
}

/// Highscore kept in memory only. Lost when the process exits.
#[derive(Debug)]
pub struct MemoryHighscoreStore {
    tx: watch::Sender<u32>,
}

impl MemoryHighscoreStore {
    /// Creates a store starting at `initial`.
    #[instrument]
    pub fn new(initial: u32) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }
}

impl Default for MemoryHighscoreStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HighscoreStore for MemoryHighscoreStore {
    fn current(&self) -> u32 {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }

    #[instrument(skip(self))]
    fn save_highscore(&self, value: u32) -> Result<(), HighscoreError> {
        self.tx.send_replace(value);
        Ok(())
    }

    fn reset(&self) -> Result<(), HighscoreError> {
        self.tx.send_replace(0);
        Ok(())
    }
}

/// Highscore persisted in SQLite.
///
/// Writes are serialized so the broadcast value always matches the last
/// successful write.
#[derive(Debug)]
pub struct SqliteHighscoreStore {
    repository: HighscoreRepository,
    tx: watch::Sender<u32>,
    write_lock: Mutex<()>,
}

impl SqliteHighscoreStore {
    /// Opens the database at `db_path` and loads the stored highscore.
    ///
    /// # Errors
    ///
    /// Returns [`HighscoreError`] if the database cannot be opened or read.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, HighscoreError> {
        let repository = HighscoreRepository::open(db_path.as_ref().to_string())?;
        let initial = repository.highscore()?;
        info!(highscore = initial, db_path = %repository.db_path(), "Highscore store ready");
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            repository,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    /// The underlying repository.
    pub fn repository(&self) -> &HighscoreRepository {
        &self.repository
    }
}

impl HighscoreStore for SqliteHighscoreStore {
    fn current(&self) -> u32 {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }

    #[instrument(skip(self))]
    fn save_highscore(&self, value: u32) -> Result<(), HighscoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.repository.save_highscore(value)?;
        self.tx.send_replace(value);
        Ok(())
    }

    #[instrument(skip(self))]
    fn reset(&self) -> Result<(), HighscoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.repository.reset()?;
        self.tx.send_replace(0);
        Ok(())
    }
}
