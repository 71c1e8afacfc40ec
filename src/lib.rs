//! Othello (Reversi) engine.
//!
//! - [`board`] - bitboard state, move generation, flips and scoring
//! - [`ai`] - heuristic evaluators and the time-bounded alpha-beta search
//! - [`game`] - a game session for interactive front ends
//! - [`runner`] - the AI-vs-AI series runner behind the console binary
//! - [`wasm`] - `wasm-bindgen` facade over [`game`]
//!
//! ```
//! use std::time::Duration;
//!
//! use othello_engine::ai::{AgentType, find_best_move};
//! use othello_engine::board::Board;
//! use othello_engine::types::Color;
//!
//! let board = Board::new(Color::Black);
//! let outcome = find_best_move(&board, 2, Duration::from_secs(5), AgentType::Composite)?;
//! let next = board.execute_move(outcome.best_move.expect("opening has moves"));
//! assert_eq!(next.turn(), Color::White);
//! # Ok::<(), othello_engine::error::EngineError>(())
//! ```

use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod error;
pub mod game;
pub mod runner;
pub mod types;
pub mod wasm;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
