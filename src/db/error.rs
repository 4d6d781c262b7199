//! Database error types.

use derive_more::{Display, Error};
use strum::Display as StrumDisplay;
use tracing::instrument;

/// Stage of a database operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum DbErrorKind {
    /// Opening the SQLite file.
    Connection,
    /// Applying embedded migrations.
    Migration,
    /// Running a query or statement.
    Query,
    /// Stored data violates an expectation of the domain.
    Corrupt,
}

/// Highscore database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Highscore database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failed stage.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}
