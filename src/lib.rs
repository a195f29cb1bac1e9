// lib.rs
// Library modules for the bingo game

pub mod defs;
pub mod error;
pub mod logging;
pub mod config;
pub mod card;
pub mod drawer;
pub mod strategy;
pub mod notify;
pub mod player;
pub mod game;
pub mod terminal;

pub use card::{Card, CardGenerator};
pub use drawer::BallDrawer;
pub use error::{BingoError, Result};
pub use game::{FinishReason, GameSession, GameState, RoundOutcome, SessionBuilder, Winner};
pub use player::Player;
pub use strategy::WinStrategy;
