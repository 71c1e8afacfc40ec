//! Error types for the Othello engine.

use std::time::Duration;

use thiserror::Error;

use crate::types::Move;

/// Errors that can occur in the engine and its game session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Board indexed outside `0..8` on either axis
    #[error("board access out of range: ({col}, {row})")]
    OutOfRange { col: u8, row: u8 },

    /// Search exceeded its wall-clock budget
    #[error("search timed out after {budget:?}")]
    SearchTimeout { budget: Duration },

    #[error("illegal move: {mv}")]
    IllegalMove { mv: Move },

    #[error("game is already over")]
    GameOver,

    #[error("it is not the {0} player's turn")]
    NotYourTurn(&'static str),

    #[error("invalid move notation: {0:?}")]
    InvalidNotation(String),

    #[error("unknown agent type: {0:?}")]
    UnknownAgent(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
