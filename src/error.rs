// src/error.rs
// Error type shared by card construction, the ball drawer and the game session.

use crate::defs::Number;

/// Errors raised when building cards, drawers or sessions.
///
/// Running out of balls is not an error: it is reported through
/// `Option`/`RoundOutcome` because every game can end that way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BingoError {
    #[error("a {rows}x{cols} card cannot be filled from the B-I-N-G-O column ranges")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("expected {expected} numbers for the card, got {actual}")]
    InvalidNumberCount { expected: usize, actual: usize },

    #[error("invalid number range {min}..={max}")]
    InvalidRange { min: Number, max: Number },

    #[error("draw order is not a permutation of {min}..={max}")]
    InvalidDrawOrder { min: Number, max: Number },

    #[error("unknown win strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid roster entry '{0}' (expected NAME or NAME:CARDS)")]
    InvalidRosterEntry(String),

    #[error("the win strategy can only be chosen before the first round")]
    StrategyLocked,

    #[error("no win strategy has been chosen for this session")]
    NoStrategy,

    #[error("game {0} has already finished")]
    SessionFinished(String),
}

pub type Result<T> = std::result::Result<T, BingoError>;
