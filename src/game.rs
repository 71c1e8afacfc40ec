use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::ai::heuristics::AgentType;
use crate::ai::search::{
    DEFAULT_TIMEOUT_SECS, LeafPerspective, PassPolicy, SearchConfig, Searcher,
};
use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::types::{Cell, Color, GameResult, GameState, Move, Position};

pub trait MoveSelector: Send + Sync {
    fn select_move(&self, board: &Board, config: &SearchConfig) -> EngineResult<Option<Move>>;
}

/// Picks the move the alpha-beta search backs up.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphaBetaSelector;

impl MoveSelector for AlphaBetaSelector {
    fn select_move(&self, board: &Board, config: &SearchConfig) -> EngineResult<Option<Move>> {
        Ok(Searcher::new(*config).search(board)?.best_move)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&self, board: &Board, _config: &SearchConfig) -> EngineResult<Option<Move>> {
        Ok(board.legal_moves().first().copied().map(Move::Place))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "agent", rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Agent(AgentType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub black: PlayerKind,
    pub white: PlayerKind,
    pub first: Color,
    /// Search depth used by agents.
    pub level: u8,
    pub timeout: Duration,
    pub pass_policy: PassPolicy,
    pub leaf_perspective: LeafPerspective,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            black: PlayerKind::Human,
            white: PlayerKind::Agent(AgentType::Composite),
            first: Color::Black,
            level: 3,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pass_policy: PassPolicy::Recurse,
            leaf_perspective: LeafPerspective::Leaf,
        }
    }
}

impl GameConfig {
    pub fn player(&self, color: Color) -> PlayerKind {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

pub struct GameInstance {
    board: Board,
    config: GameConfig,
    pub is_game_over: bool,
    pub is_pass: bool,
    pub last_move: Option<Move>,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector>) -> Self {
        let board = Board::new(config.first);
        Self {
            board,
            config,
            is_game_over: board.is_game_over(),
            is_pass: false,
            last_move: None,
            selector,
        }
    }

    pub fn new_with_default_selector(config: GameConfig) -> Self {
        Self::new(config, Box::new(AlphaBetaSelector))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_player(&self) -> Color {
        self.board.turn()
    }

    /// Human move. The coordinate must be one of the current legal moves.
    pub fn place(&mut self, col: u8, row: u8) -> EngineResult<()> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        if self.config.player(self.current_player()) != PlayerKind::Human {
            return Err(EngineError::NotYourTurn("human"));
        }

        let pos = Position::new(col, row).ok_or(EngineError::OutOfRange { col, row })?;
        self.apply_move(Move::Place(pos))
    }

    /// Human move given in notation such as `c4`.
    pub fn place_notation(&mut self, notation: &str) -> EngineResult<()> {
        let pos: Position = notation.parse()?;
        self.place(pos.col, pos.row)
    }

    pub fn has_legal_moves_for_current(&self) -> bool {
        self.board.has_legal_move(self.current_player())
    }

    /// `true` when the side to move has to pass.
    pub fn needs_pass(&self) -> bool {
        !self.is_game_over && !self.has_legal_moves_for_current()
    }

    pub fn pass(&mut self) -> EngineResult<()> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        if self.has_legal_moves_for_current() {
            return Err(EngineError::IllegalMove { mv: Move::Pass });
        }
        self.apply_move(Move::Pass)
    }

    /// Lets the agent bound to the side to move play, passing when it has to.
    ///
    /// # Errors
    ///
    /// A search timeout is returned as is; the session does not substitute a move.
    pub fn do_ai_move(&mut self) -> EngineResult<Move> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        let PlayerKind::Agent(agent) = self.config.player(self.current_player()) else {
            return Err(EngineError::NotYourTurn("AI"));
        };

        if !self.has_legal_moves_for_current() {
            self.apply_move(Move::Pass)?;
            return Ok(Move::Pass);
        }

        let search = SearchConfig {
            max_depth: self.config.level,
            timeout: self.config.timeout,
            agent,
            pass_policy: self.config.pass_policy,
            leaf_perspective: self.config.leaf_perspective,
        };
        // A search whose every line backs up an infinite bound selects nothing.
        let selected = match self.selector.select_move(&self.board, &search)? {
            Some(mv) => mv,
            None => FirstLegalMoveSelector
                .select_move(&self.board, &search)?
                .unwrap_or(Move::Pass),
        };

        self.apply_move(selected)?;
        Ok(selected)
    }

    pub fn get_legal_moves(&self) -> Vec<Position> {
        if self.is_game_over {
            return Vec::new();
        }
        self.board.legal_moves()
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player(),
            black_count: self.board.count(Cell::Black),
            white_count: self.board.count(Cell::White),
            is_game_over: self.is_game_over,
            is_pass: self.is_pass,
            flipped: self.board.last_flipped(),
            last_move: self.last_move,
        }
    }

    pub fn to_game_result(&self) -> GameResult {
        let (black_score, white_score) = self.board.final_score();
        GameResult {
            winner: match black_score.cmp(&white_score) {
                std::cmp::Ordering::Greater => Some(Color::Black),
                std::cmp::Ordering::Less => Some(Color::White),
                std::cmp::Ordering::Equal => None,
            },
            black_score,
            white_score,
        }
    }

    fn apply_move(&mut self, mv: Move) -> EngineResult<()> {
        let mover = self.current_player();
        match mv {
            Move::Place(pos) if !self.board.legal_moves().contains(&pos) => {
                return Err(EngineError::IllegalMove { mv });
            }
            Move::Pass if self.has_legal_moves_for_current() => {
                return Err(EngineError::IllegalMove { mv });
            }
            _ => {}
        }

        self.board = self.board.execute_move(mv);
        self.is_pass = mv == Move::Pass;
        self.last_move = Some(mv);
        self.is_game_over = self.board.is_game_over();
        debug!(%mover, %mv, flips = self.board.last_flip_count(), "move applied");

        Ok(())
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board) {
        self.board = board;
        self.is_game_over = board.is_game_over();
        self.is_pass = false;
        self.last_move = None;
    }
}
