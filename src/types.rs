use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EngineError;

pub const BOARD_SIZE: u8 = 8;

/// Side to move. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    pub fn is_black(self) -> bool {
        self == Self::Black
    }

    pub fn cell(self) -> Cell {
        match self {
            Self::Black => Cell::Black,
            Self::White => Cell::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Black => "Black",
            Self::White => "White",
        })
    }
}

/// Content of a single square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::Black => Some(Color::Black),
            Self::White => Some(Color::White),
        }
    }
}

/// A board coordinate, `col` and `row` both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub col: u8,
    pub row: u8,
}

impl Position {
    /// Returns `None` when either axis is outside the board.
    pub fn new(col: u8, row: u8) -> Option<Self> {
        (col < BOARD_SIZE && row < BOARD_SIZE).then_some(Self { col, row })
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            col: (index % BOARD_SIZE as usize) as u8,
            row: (index / BOARD_SIZE as usize) as u8,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }
}

/// `(2, 3)` renders as `c4`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidNotation(s.to_string());
        let mut chars = s.trim().chars();
        let file = chars.next().ok_or_else(invalid)?.to_ascii_lowercase();
        let rank: u8 = chars.as_str().parse().map_err(|_| invalid())?;
        if !('a'..='h').contains(&file) || !(1..=BOARD_SIZE).contains(&rank) {
            return Err(invalid());
        }
        Ok(Self {
            col: file as u8 - b'a',
            row: rank - 1,
        })
    }
}

/// A placement or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    Place(Position),
    Pass,
}

impl Move {
    pub fn position(self) -> Option<Position> {
        match self {
            Self::Place(pos) => Some(pos),
            Self::Pass => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(pos) => write!(f, "{pos}"),
            Self::Pass => f.write_str("pass"),
        }
    }
}

/// Formats moves as `c4, f3`.
pub fn moves_string(moves: &[Position]) -> String {
    moves
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Public game state returned from session and WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Row-major cells, `row * 8 + col`.
    pub board: Vec<Cell>,
    pub current_player: Color,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the previous action was a pass.
    /// - `false` when the previous action was a normal move.
    pub is_pass: bool,
    /// Contract:
    /// - Normal move: list of flipped positions.
    /// - Pass: must be an empty list.
    pub flipped: Vec<Position>,
    pub last_move: Option<Move>,
}

/// Final result after game over, using winner-takes-empties scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Option<Color>,
    pub black_score: u8,
    pub white_score: u8,
}
