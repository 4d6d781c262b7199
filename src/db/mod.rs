//! Database persistence layer for the highscore.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{HighscoreRow, NewHighscore};
pub use repository::HighscoreRepository;
