use std::fmt;

use crate::error::{EngineError, EngineResult};
use crate::types::{Cell, Color, Move, Position};

const BOARD_SIZE: usize = 8;
const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
/// `(col, row)` offsets: the four orthogonals and the four diagonals.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Othello board state represented by two bitboards, square `row * 8 + col`.
///
/// A board is never mutated once produced; moves are applied with
/// [`Board::execute_move`], which returns a new board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
    turn: Color,
    /// Discs flipped by the move that produced this board.
    last_flips: u64,
}

impl Board {
    /// Creates the initial board with `turn` to move:
    /// black at (3,3) and (4,4), white at (3,4) and (4,3).
    pub fn new(turn: Color) -> Self {
        Self {
            black: bit(square(3, 3)) | bit(square(4, 4)),
            white: bit(square(3, 4)) | bit(square(4, 3)),
            turn,
            last_flips: 0,
        }
    }

    /// Builds a board from raw bitboards. Squares set in both masks are black.
    pub fn from_bitboards(black: u64, white: u64, turn: Color) -> Self {
        Self {
            black,
            white: white & !black,
            turn,
            last_flips: 0,
        }
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Bounds-checked cell access.
    pub fn get(&self, col: u8, row: u8) -> EngineResult<Cell> {
        let pos = Position::new(col, row).ok_or(EngineError::OutOfRange { col, row })?;
        Ok(self.cell_at(pos))
    }

    /// Returns a copy with one cell replaced.
    pub fn with_cell(&self, col: u8, row: u8, cell: Cell) -> EngineResult<Self> {
        let pos = Position::new(col, row).ok_or(EngineError::OutOfRange { col, row })?;
        let mask = bit(pos.index());
        let mut next = *self;
        next.black &= !mask;
        next.white &= !mask;
        match cell {
            Cell::Black => next.black |= mask,
            Cell::White => next.white |= mask,
            Cell::Empty => {}
        }
        Ok(next)
    }

    pub(crate) fn with_turn(&self, turn: Color) -> Self {
        Self { turn, ..*self }
    }

    pub fn cell_at(&self, pos: Position) -> Cell {
        if pos.col as usize >= BOARD_SIZE || pos.row as usize >= BOARD_SIZE {
            return Cell::Empty;
        }
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            Cell::Black
        } else if (self.white & square) != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    /// Number of squares holding `cell` (`Cell::Empty` counts empties).
    pub fn count(&self, cell: Cell) -> u8 {
        self.mask(cell).count_ones() as u8
    }

    /// Number of discs of the side to move.
    pub fn count_turn(&self) -> u8 {
        self.count(self.turn.cell())
    }

    pub fn empty_count(&self) -> u8 {
        self.count(Cell::Empty)
    }

    /// Coordinates of every square holding `cell`.
    pub fn squares(&self, cell: Cell) -> Vec<Position> {
        positions(self.mask(cell))
    }

    pub fn squares_turn(&self) -> Vec<Position> {
        self.squares(self.turn.cell())
    }

    /// Number of discs flipped by the move that produced this board.
    pub fn last_flip_count(&self) -> u32 {
        self.last_flips.count_ones()
    }

    pub fn last_flipped(&self) -> Vec<Position> {
        positions(self.last_flips)
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Position> {
        self.legal_moves_for(self.turn)
    }

    /// Legal moves for `color`, deduplicated, in ascending square order.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Position> {
        positions(self.legal_mask(color))
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.legal_mask(color) != 0
    }

    /// Union of [`Board::moves_for_square`] over every disc of `color`.
    pub(crate) fn legal_mask(&self, color: Color) -> u64 {
        let (me, opp) = self.sides(color);
        let mut legal = 0u64;
        for origin in iter_bits(me) {
            for direction in DIRECTIONS {
                if let Some(target) = discover_move(origin, direction, me, opp) {
                    legal |= bit(target);
                }
            }
        }
        legal
    }

    /// Moves that use the disc on `square` as their anchor: one empty
    /// endpoint per direction that first crosses at least one opposing disc.
    /// Empty squares anchor nothing.
    pub fn moves_for_square(&self, square: Position) -> Vec<Position> {
        let Some(color) = self.cell_at(square).color() else {
            return Vec::new();
        };
        let (me, opp) = self.sides(color);
        let targets = DIRECTIONS
            .iter()
            .filter_map(|&direction| discover_move(square.index(), direction, me, opp))
            .fold(0u64, |mask, target| mask | bit(target));
        positions(targets)
    }

    /// Applies `mv` for the side to move.
    pub fn execute_move(&self, mv: Move) -> Self {
        self.execute_move_as(mv, self.turn)
    }

    /// Returns a new board with `mv` played by `color` and the turn handed to
    /// `color`'s opponent. The receiver is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if a placement lies outside the board. Legal moves never do.
    pub fn execute_move_as(&self, mv: Move, color: Color) -> Self {
        let mut next = *self;
        next.turn = color.opponent();
        next.last_flips = 0;

        let Move::Place(pos) = mv else {
            return next;
        };
        assert!(
            Position::new(pos.col, pos.row).is_some(),
            "move {pos:?} is outside the board"
        );

        let (me, opp) = self.sides(color);
        let target = pos.index();
        let flips = collect_flips(target, me, opp);
        let next_me = me | bit(target) | flips;
        let next_opp = opp & !(flips | bit(target));

        if color.is_black() {
            next.black = next_me;
            next.white = next_opp;
        } else {
            next.white = next_me;
            next.black = next_opp;
        }
        next.last_flips = flips;
        next
    }

    /// Successors for the side to move.
    pub fn successors(&self) -> Vec<(Move, Board)> {
        self.successors_for(self.turn)
    }

    /// `(move, resulting board)` for every legal move of `color`.
    pub fn successors_for(&self, color: Color) -> Vec<(Move, Board)> {
        iter_bits(self.legal_mask(color))
            .map(|target| {
                let mv = Move::Place(Position::from_index(target));
                (mv, self.execute_move_as(mv, color))
            })
            .collect()
    }

    pub fn is_game_over(&self) -> bool {
        !self.has_legal_move(Color::Black) && !self.has_legal_move(Color::White)
    }

    /// Returns `(black, white)`. The side with more discs also takes every
    /// empty square; a tie is returned as counted.
    pub fn final_score(&self) -> (u8, u8) {
        let black = self.count(Cell::Black);
        let white = self.count(Cell::White);
        let empty = self.empty_count();
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => (black + empty, white),
            std::cmp::Ordering::Less => (black, white + empty),
            std::cmp::Ordering::Equal => (black, white),
        }
    }

    /// Row-major copy of every cell.
    pub fn to_array(&self) -> [Cell; NUM_SQUARES] {
        let mut board = [Cell::Empty; NUM_SQUARES];
        for (index, cell) in board.iter_mut().enumerate() {
            *cell = self.cell_at(Position::from_index(index));
        }
        board
    }

    /// `(mine, theirs)` bitboards from `color`'s point of view.
    pub(crate) fn sides(&self, color: Color) -> (u64, u64) {
        if color.is_black() {
            (self.black, self.white)
        } else {
            (self.white, self.black)
        }
    }

    fn mask(&self, cell: Cell) -> u64 {
        match cell {
            Cell::Black => self.black,
            Cell::White => self.white,
            Cell::Empty => !(self.black | self.white),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Color::Black)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    A B C D E F G H")?;
        writeln!(f, "    ---------------")?;
        for row in (0..BOARD_SIZE as u8).rev() {
            write!(f, "{} | ", row + 1)?;
            for col in 0..BOARD_SIZE as u8 {
                let symbol = match self.cell_at(Position { col, row }) {
                    Cell::Black => 'B',
                    Cell::White => 'W',
                    Cell::Empty => '.',
                };
                write!(f, "{symbol} ")?;
            }
            writeln!(f, "| {}", row + 1)?;
        }
        writeln!(f, "    ---------------")?;
        write!(f, "    A B C D E F G H")
    }
}

/// Builds crafted layouts one override at a time.
#[derive(Debug, Clone, Copy)]
pub struct BoardBuilder {
    board: Board,
}

impl BoardBuilder {
    /// Starts from a board with no discs.
    pub fn empty(turn: Color) -> Self {
        Self {
            board: Board::from_bitboards(0, 0, turn),
        }
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board: Board {
                last_flips: 0,
                ..board
            },
        }
    }

    pub fn cell(self, col: u8, row: u8, cell: Cell) -> EngineResult<Self> {
        Ok(Self {
            board: self.board.with_cell(col, row, cell)?,
        })
    }

    /// Places `color` on every `(col, row)` in `squares`.
    pub fn discs(self, color: Color, squares: &[(u8, u8)]) -> EngineResult<Self> {
        squares
            .iter()
            .try_fold(self, |builder, &(col, row)| builder.cell(col, row, color.cell()))
    }

    pub fn turn(self, turn: Color) -> Self {
        Self {
            board: self.board.with_turn(turn),
        }
    }

    pub fn build(self) -> Board {
        self.board
    }
}

/// Endpoint of a move anchored at `origin` heading in `direction`, if the
/// ray crosses at least one opposing disc and then reaches an empty square.
fn discover_move(origin: usize, direction: (i32, i32), me: u64, opp: u64) -> Option<usize> {
    let (col, row) = index_to_col_row(origin);
    let (dc, dr) = direction;
    let mut c = col + dc;
    let mut r = row + dr;
    let mut has_opponent = false;

    while in_bounds(c, r) {
        let target = (r as usize) * BOARD_SIZE + c as usize;
        let square = bit(target);
        if (opp & square) != 0 {
            has_opponent = true;
        } else if (me & square) != 0 {
            return None;
        } else {
            return has_opponent.then_some(target);
        }

        c += dc;
        r += dr;
    }

    None
}

/// Opposing discs outflanked by a disc placed on `pos`.
fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
    if pos >= NUM_SQUARES {
        return 0;
    }

    let (col, row) = index_to_col_row(pos);
    let mut flips = 0u64;

    for (dc, dr) in DIRECTIONS {
        let mut c = col + dc;
        let mut r = row + dr;
        let mut line = 0u64;

        while in_bounds(c, r) {
            let square = bit((r as usize) * BOARD_SIZE + c as usize);
            if (opp & square) != 0 {
                line |= square;
            } else if (me & square) != 0 {
                flips |= line;
                break;
            } else {
                break;
            }

            c += dc;
            r += dr;
        }
    }

    flips
}

fn square(col: usize, row: usize) -> usize {
    row * BOARD_SIZE + col
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn index_to_col_row(pos: usize) -> (i32, i32) {
    ((pos % BOARD_SIZE) as i32, (pos / BOARD_SIZE) as i32)
}

fn in_bounds(col: i32, row: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&col) && (0..BOARD_SIZE as i32).contains(&row)
}

pub(crate) fn iter_bits(mut mask: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let index = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(index)
    })
}

fn positions(mask: u64) -> Vec<Position> {
    iter_bits(mask).map(Position::from_index).collect()
}
