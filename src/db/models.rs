//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};

/// The single stored highscore row.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::highscore)]
pub struct HighscoreRow {
    id: i32,
    score: i32,
    updated_at: NaiveDateTime,
}

impl HighscoreRow {
    /// Primary key of the only row the table may hold.
    pub const SINGLETON_ID: i32 = 1;

    /// Stored score as an unsigned value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored value is negative.
    #[instrument(skip(self), fields(score = self.score))]
    pub fn score_u32(&self) -> Result<u32, DbError> {
        u32::try_from(self.score).map_err(|_| {
            DbError::new(
                DbErrorKind::Corrupt,
                format!("Stored highscore is negative: {}", self.score),
            )
        })
    }
}

/// Insertable highscore value. Always targets the singleton row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::highscore)]
pub struct NewHighscore {
    #[new(value = "HighscoreRow::SINGLETON_ID")]
    id: i32,
    score: i32,
}
