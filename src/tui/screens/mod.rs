//! Screen implementations for the terminal UI.

mod game;
mod home;

pub use game::GameScreen;
pub use home::HomeScreen;
