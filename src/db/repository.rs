//! Database repository for the persisted highscore.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind, HighscoreRow, NewHighscore, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for highscore reads and writes.
#[derive(Debug, Clone)]
pub struct HighscoreRepository {
    db_path: String,
}

impl HighscoreRepository {
    /// Opens the database at the given path, creating it and applying
    /// pending migrations if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening highscore database");
        let repository = Self { db_path };

        let mut conn = repository.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        debug!(count = applied.len(), "Migrations applied");

        Ok(repository)
    }

    /// Path of the backing SQLite file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Returns the stored highscore row, if one has been written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn row(&self) -> Result<Option<HighscoreRow>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::highscore::table
            .find(HighscoreRow::SINGLETON_ID)
            .select(HighscoreRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row)
    }

    /// Returns the stored highscore, zero if none has been written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the stored value is corrupt.
    #[instrument(skip(self))]
    pub fn highscore(&self) -> Result<u32, DbError> {
        let score = match self.row()? {
            Some(row) => row.score_u32()?,
            None => 0,
        };
        debug!(score, "Highscore loaded");
        Ok(score)
    }

    /// Overwrites the stored highscore.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the value does not fit the column or a database error occurs.
    #[instrument(skip(self))]
    pub fn save_highscore(&self, score: u32) -> Result<HighscoreRow, DbError> {
        let stored = i32::try_from(score).map_err(|_| {
            DbError::new(DbErrorKind::Query, format!("Highscore {} out of range", score))
        })?;
        let mut conn = self.connection()?;

        diesel::replace_into(schema::highscore::table)
            .values(&NewHighscore::new(stored))
            .execute(&mut conn)?;

        let row = schema::highscore::table
            .find(HighscoreRow::SINGLETON_ID)
            .select(HighscoreRow::as_select())
            .first(&mut conn)?;

        info!(score, updated_at = %row.updated_at(), "Highscore saved");
        Ok(row)
    }

    /// Removes the stored highscore.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(schema::highscore::table).execute(&mut conn)?;
        info!(deleted, "Highscore reset");
        Ok(())
    }
}
