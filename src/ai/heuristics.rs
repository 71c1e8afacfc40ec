//! Board evaluators used at search cutoff.
//!
//! Every evaluator scores the board from the point of view of the side to
//! move: positive values favor `board.turn()`.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::board::{Board, iter_bits};
use crate::error::EngineError;

const BOARD_SIZE: usize = 8;
const CORNERS: [usize; 4] = [0, 7, 56, 63];
const CORNER_WEIGHT: f64 = 25.0;
const CLOSENESS_WEIGHT: f64 = -12.5;

/// Rows 0..=3 of the positional table; rows 4..=7 mirror them.
const WEIGHT_ROWS: [[i32; BOARD_SIZE]; 4] = [
    [20, -3, 11, 8, 8, 11, -3, 20],
    [-3, -7, -4, 1, 1, -4, -7, -3],
    [11, -4, 2, 2, 2, 2, -4, 11],
    [8, 1, 2, -3, -3, 2, 1, 8],
];

static POSITION_WEIGHTS: Lazy<[i32; BOARD_SIZE * BOARD_SIZE]> = Lazy::new(|| {
    let mut weights = [0; BOARD_SIZE * BOARD_SIZE];
    for (index, weight) in weights.iter_mut().enumerate() {
        let row = index / BOARD_SIZE;
        *weight = WEIGHT_ROWS[row.min(BOARD_SIZE - 1 - row)][index % BOARD_SIZE];
    }
    weights
});

/// Non-corner squares touching each corner, in `CORNERS` order.
static CORNER_NEIGHBORS: Lazy<[u64; 4]> =
    Lazy::new(|| CORNERS.map(|corner| neighbors(corner) & !corner_mask()));

pub type Evaluator = fn(&Board) -> f64;

/// Named agent, bound to exactly one evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    /// Disc difference
    Greedy,
    /// Discs flipped by the last move
    FlipGreedy,
    /// Legal move difference
    Mobility,
    /// Corner occupancy
    Corner,
    /// Weighted blend of parity, corners, closeness, mobility, frontier and position
    Composite,
    MobileGreedy,
    GreedyCorner,
}

impl AgentType {
    pub fn evaluator(self) -> Evaluator {
        match self {
            Self::Greedy => token_difference,
            Self::FlipGreedy => flip_count,
            Self::Mobility => mobility,
            Self::Corner => corner_occupancy,
            Self::Composite => composite,
            Self::MobileGreedy => mobile_greedy,
            Self::GreedyCorner => greedy_corner,
        }
    }

    pub fn evaluate(self, board: &Board) -> f64 {
        (self.evaluator())(board)
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

impl FromStr for AgentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| EngineError::UnknownAgent(s.to_string()))
    }
}

pub fn token_difference(board: &Board) -> f64 {
    let (me, opp) = board.sides(board.turn());
    me.count_ones() as f64 - opp.count_ones() as f64
}

pub fn flip_count(board: &Board) -> f64 {
    board.last_flip_count() as f64
}

/// Legal-move difference scaled to `-100..=100`.
pub fn mobility(board: &Board) -> f64 {
    let (mine, theirs) = move_counts(board);
    if mine + theirs == 0.0 {
        return 0.0;
    }
    100.0 * (mine - theirs) / (mine + theirs)
}

pub fn corner_occupancy(board: &Board) -> f64 {
    let (me, opp) = board.sides(board.turn());
    let corners = corner_mask();
    CORNER_WEIGHT * ((me & corners).count_ones() as f64 - (opp & corners).count_ones() as f64)
}

pub fn composite(board: &Board) -> f64 {
    let (me, opp) = board.sides(board.turn());
    let (my_moves, their_moves) = move_counts(board);

    let parity = dominance(me.count_ones() as f64, opp.count_ones() as f64);
    let frontier = -dominance(frontier_count(board, me), frontier_count(board, opp));
    let mobility = dominance(my_moves, their_moves);

    10.0 * parity
        + 801.724 * corner_occupancy(board)
        + 382.026 * corner_closeness(board)
        + 78.922 * mobility
        + 74.396 * frontier
        + 10.0 * positional(board)
}

pub fn mobile_greedy(board: &Board) -> f64 {
    10.0 * token_difference(board) + 42.0 * mobility(board)
}

pub fn greedy_corner(board: &Board) -> f64 {
    10.0 * token_difference(board) + 801.0 * corner_occupancy(board)
}

/// Sum of the positional table over own discs minus the opponent's.
fn positional(board: &Board) -> f64 {
    let (me, opp) = board.sides(board.turn());
    let weights = &*POSITION_WEIGHTS;
    let mine: i32 = iter_bits(me).map(|index| weights[index]).sum();
    let theirs: i32 = iter_bits(opp).map(|index| weights[index]).sum();
    (mine - theirs) as f64
}

/// Penalty for discs next to a corner that is still empty.
fn corner_closeness(board: &Board) -> f64 {
    let (me, opp) = board.sides(board.turn());
    let occupied = me | opp;
    let (mut mine, mut theirs) = (0u32, 0u32);
    for (corner, around) in CORNERS.iter().zip(CORNER_NEIGHBORS.iter()) {
        if occupied & (1u64 << corner) != 0 {
            continue;
        }
        mine += (me & around).count_ones();
        theirs += (opp & around).count_ones();
    }
    CLOSENESS_WEIGHT * (mine as f64 - theirs as f64)
}

/// Discs in `discs` with at least one empty neighbor.
fn frontier_count(board: &Board, discs: u64) -> f64 {
    let (me, opp) = board.sides(board.turn());
    let empty = !(me | opp);
    iter_bits(discs)
        .filter(|&index| neighbors(index) & empty != 0)
        .count() as f64
}

/// Share held by the larger side, signed toward the side to move.
fn dominance(mine: f64, theirs: f64) -> f64 {
    if mine > theirs {
        100.0 * mine / (mine + theirs)
    } else if mine < theirs {
        -100.0 * theirs / (mine + theirs)
    } else {
        0.0
    }
}

fn move_counts(board: &Board) -> (f64, f64) {
    let turn = board.turn();
    (
        board.legal_mask(turn).count_ones() as f64,
        board.legal_mask(turn.opponent()).count_ones() as f64,
    )
}

fn corner_mask() -> u64 {
    CORNERS.iter().fold(0, |mask, corner| mask | (1u64 << corner))
}

/// The up to eight squares around `index`.
fn neighbors(index: usize) -> u64 {
    let col = (index % BOARD_SIZE) as i32;
    let row = (index / BOARD_SIZE) as i32;
    let mut mask = 0u64;
    for dc in -1..=1 {
        for dr in -1..=1 {
            let (c, r) = (col + dc, row + dr);
            if (dc, dr) != (0, 0) && (0..8).contains(&c) && (0..8).contains(&r) {
                mask |= 1u64 << (r as usize * BOARD_SIZE + c as usize);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardBuilder;
    use crate::board::tests::pass_configuration_board;
    use crate::types::{Color, Move, Position};

    const ALL: [AgentType; 7] = [
        AgentType::Greedy,
        AgentType::FlipGreedy,
        AgentType::Mobility,
        AgentType::Corner,
        AgentType::Composite,
        AgentType::MobileGreedy,
        AgentType::GreedyCorner,
    ];

    fn corners_board() -> Board {
        BoardBuilder::empty(Color::Black)
            .discs(Color::Black, &[(0, 0), (7, 7)])
            .and_then(|b| b.discs(Color::White, &[(0, 7)]))
            .map(BoardBuilder::build)
            .unwrap()
    }

    #[test]
    fn opening_position_is_balanced_for_every_agent() {
        let board = Board::new(Color::Black);

        for agent in ALL {
            assert_eq!(agent.evaluate(&board), 0.0, "{agent}");
        }
    }

    #[test]
    fn token_difference_is_from_side_to_move() {
        let board = Board::new(Color::Black).execute_move(Move::Place(Position { col: 2, row: 4 }));

        assert_eq!(board.turn(), Color::White);
        assert_eq!(token_difference(&board), -3.0);
        assert_eq!(flip_count(&board), 1.0);
    }

    #[test]
    fn mobility_is_normalized_to_one_hundred() {
        let board = pass_configuration_board();

        assert_eq!(mobility(&board), -100.0);
        assert_eq!(mobility(&board.with_turn(Color::Black)), 100.0);
        assert_eq!(mobile_greedy(&board), 10.0 * -11.0 + 42.0 * -100.0);
    }

    #[test]
    fn mobility_is_zero_when_nobody_can_move() {
        let board = Board::from_bitboards(u64::MAX, 0, Color::White);
        assert_eq!(mobility(&board), 0.0);
    }

    #[test]
    fn corner_weights_compose_into_greedy_corner() {
        let board = corners_board();

        assert_eq!(corner_occupancy(&board), 25.0);
        assert_eq!(greedy_corner(&board), 10.0 + 801.0 * 25.0);
        assert_eq!(corner_occupancy(&board.with_turn(Color::White)), -25.0);
    }

    #[test]
    fn positional_table_is_symmetric_and_rewards_corners() {
        let weights = &*POSITION_WEIGHTS;

        for corner in CORNERS {
            assert_eq!(weights[corner], 20);
        }
        assert_eq!(weights[9], -7);
        assert_eq!(weights[54], -7);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let index = row * BOARD_SIZE + col;
                assert_eq!(weights[index], weights[(7 - row) * BOARD_SIZE + col]);
                assert_eq!(weights[index], weights[row * BOARD_SIZE + 7 - col]);
            }
        }
    }

    #[test]
    fn closeness_penalizes_discs_next_to_an_empty_corner() {
        let board = BoardBuilder::empty(Color::Black)
            .discs(Color::Black, &[(1, 1)])
            .and_then(|b| b.discs(Color::White, &[(6, 6), (7, 7)]))
            .map(BoardBuilder::build)
            .unwrap();

        // (6,6) sits next to an occupied corner and is ignored.
        assert_eq!(corner_closeness(&board), -12.5);
    }

    #[test]
    fn composite_prefers_owning_corners() {
        let board = corners_board();

        assert!(composite(&board) > 0.0);
        assert!(composite(&board.with_turn(Color::White)) < 0.0);
    }

    #[test]
    fn frontier_counts_discs_touching_empties() {
        let board = Board::new(Color::Black);
        let (me, opp) = board.sides(Color::Black);

        assert_eq!(frontier_count(&board, me), 2.0);
        assert_eq!(frontier_count(&board, opp), 2.0);
        let full = Board::from_bitboards(u64::MAX, 0, Color::Black);
        assert_eq!(frontier_count(&full, u64::MAX), 0.0);
    }

    #[test]
    fn agent_names_round_trip_through_from_str() {
        for agent in ALL {
            assert_eq!(agent.to_string().parse::<AgentType>().unwrap(), agent);
        }
        assert_eq!("Mobile-Greedy".parse::<AgentType>().unwrap(), AgentType::MobileGreedy);
        assert!(matches!(
            "minimax".parse::<AgentType>(),
            Err(EngineError::UnknownAgent(_))
        ));
    }

    #[test]
    fn each_agent_dispatches_to_its_evaluator() {
        let board = pass_configuration_board();

        assert_eq!(AgentType::Greedy.evaluate(&board), token_difference(&board));
        assert_eq!(AgentType::Mobility.evaluate(&board), mobility(&board));
        assert_eq!(AgentType::Composite.evaluate(&board), composite(&board));
    }
}
