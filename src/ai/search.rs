use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;
use web_time::Instant;

use crate::ai::heuristics::AgentType;
use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::types::{Color, Move};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_SCORE: f64 = f64::NEG_INFINITY;
const MAX_SCORE: f64 = f64::INFINITY;

/// What the search does at a node whose mover has no legal move while the
/// opponent still has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PassPolicy {
    /// Expand a single pass successor.
    #[default]
    Recurse,
    /// Expand nothing; the node backs up its untouched bound.
    Skip,
}

/// Whose point of view a cutoff is scored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LeafPerspective {
    /// The evaluator runs on the cutoff board as is, for its own side to move.
    #[default]
    Leaf,
    /// The cutoff board is scored for the side that moves at the root.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Plies below the root; 0 evaluates the root itself.
    pub max_depth: u8,
    pub timeout: Duration,
    pub agent: AgentType,
    pub pass_policy: PassPolicy,
    pub leaf_perspective: LeafPerspective,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            agent: AgentType::Greedy,
            pass_policy: PassPolicy::default(),
            leaf_perspective: LeafPerspective::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// `None` when the root itself was a cutoff.
    pub best_move: Option<Move>,
    pub value: f64,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Max,
    Min,
}

impl Role {
    fn next(self) -> Self {
        match self {
            Self::Max => Self::Min,
            Self::Min => Self::Max,
        }
    }
}

/// Depth- and time-bounded alpha-beta search.
pub struct Searcher {
    config: SearchConfig,
    start_time: Instant,
    root: Color,
    nodes: u64,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            root: Color::Black,
            nodes: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches from `board` with its side to move as MAX.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SearchTimeout`] once the elapsed time reaches the
    /// configured timeout. No partial result survives a timeout.
    pub fn search(&mut self, board: &Board) -> EngineResult<SearchOutcome> {
        self.start_time = Instant::now();
        self.root = board.turn();
        self.nodes = 0;

        let result = self.alphabeta(board, 0, MIN_SCORE, MAX_SCORE, Role::Max);
        let elapsed = self.start_time.elapsed();
        let (best_move, value) = result.inspect_err(|_| {
            debug!(
                agent = %self.config.agent,
                depth = self.config.max_depth,
                nodes = self.nodes,
                ?elapsed,
                "search timed out"
            );
        })?;

        debug!(
            agent = %self.config.agent,
            depth = self.config.max_depth,
            best_move = ?best_move.map(|mv| mv.to_string()),
            value,
            nodes = self.nodes,
            ?elapsed,
            "search complete"
        );

        Ok(SearchOutcome {
            best_move,
            value,
            nodes: self.nodes,
        })
    }

    fn alphabeta(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        role: Role,
    ) -> EngineResult<(Option<Move>, f64)> {
        if self.start_time.elapsed() >= self.config.timeout {
            return Err(EngineError::SearchTimeout {
                budget: self.config.timeout,
            });
        }
        self.nodes += 1;

        if depth == self.config.max_depth || board.is_game_over() {
            return Ok((None, self.evaluate(board)));
        }

        let mut successors = board.successors();
        if successors.is_empty() && self.config.pass_policy == PassPolicy::Recurse {
            successors.push((Move::Pass, board.execute_move(Move::Pass)));
        }

        let mut best_move = None;
        for (mv, child) in successors {
            let (_, value) = self.alphabeta(&child, depth + 1, alpha, beta, role.next())?;
            match role {
                Role::Max if value > alpha => {
                    best_move = Some(mv);
                    alpha = value;
                }
                Role::Min if value < beta => {
                    best_move = Some(mv);
                    beta = value;
                }
                _ => {}
            }
            if alpha >= beta {
                break;
            }
        }

        let bound = match role {
            Role::Max => alpha,
            Role::Min => beta,
        };
        Ok((best_move, bound))
    }

    /// At the root both perspectives agree.
    fn evaluate(&self, board: &Board) -> f64 {
        match self.config.leaf_perspective {
            LeafPerspective::Leaf => self.config.agent.evaluate(board),
            LeafPerspective::Root => self.config.agent.evaluate(&board.with_turn(self.root)),
        }
    }
}

/// One-shot search with the default pass policy and leaf perspective.
pub fn find_best_move(
    board: &Board,
    max_depth: u8,
    timeout: Duration,
    agent: AgentType,
) -> EngineResult<SearchOutcome> {
    Searcher::new(SearchConfig {
        max_depth,
        timeout,
        agent,
        ..SearchConfig::default()
    })
    .search(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::pass_configuration_board;
    use crate::types::Position;

    const ALL_AGENTS: [AgentType; 7] = [
        AgentType::Greedy,
        AgentType::FlipGreedy,
        AgentType::Mobility,
        AgentType::Corner,
        AgentType::Composite,
        AgentType::MobileGreedy,
        AgentType::GreedyCorner,
    ];

    fn config(max_depth: u8, agent: AgentType) -> SearchConfig {
        SearchConfig {
            max_depth,
            agent,
            ..SearchConfig::default()
        }
    }

    /// Plain minimax without pruning. `root` is `Some` to score leaves for
    /// that side instead of the leaf's own side to move.
    fn minimax(
        board: &Board,
        depth: u8,
        max_depth: u8,
        maximizing: bool,
        root: Option<Color>,
    ) -> f64 {
        if depth == max_depth || board.is_game_over() {
            let leaf = root.map_or(*board, |color| board.with_turn(color));
            return AgentType::Greedy.evaluate(&leaf);
        }
        let mut successors = board.successors();
        if successors.is_empty() {
            successors.push((Move::Pass, board.execute_move(Move::Pass)));
        }
        let values = successors
            .iter()
            .map(|(_, child)| minimax(child, depth + 1, max_depth, !maximizing, root));
        if maximizing {
            values.fold(MIN_SCORE, f64::max)
        } else {
            values.fold(MAX_SCORE, f64::min)
        }
    }

    #[test]
    fn t04_depth_zero_returns_root_evaluation() {
        for board in [Board::new(Color::Black), pass_configuration_board()] {
            for agent in ALL_AGENTS {
                let outcome = find_best_move(&board, 0, Duration::from_secs(5), agent).unwrap();

                assert_eq!(outcome.best_move, None);
                assert_eq!(outcome.value, agent.evaluate(&board));
                assert_eq!(outcome.nodes, 1);
            }
        }
    }

    #[test]
    fn t05_zero_timeout_fails_instead_of_returning_a_move() {
        let board = Board::new(Color::Black);

        let err = find_best_move(&board, 3, Duration::ZERO, AgentType::Greedy).unwrap_err();

        assert_eq!(
            err,
            EngineError::SearchTimeout {
                budget: Duration::ZERO
            }
        );
    }

    #[test]
    fn deep_search_with_tiny_budget_times_out() {
        let board = Board::new(Color::Black);
        let mut searcher = Searcher::new(SearchConfig {
            max_depth: 9,
            timeout: Duration::from_micros(1),
            agent: AgentType::Composite,
            pass_policy: PassPolicy::Recurse,
            leaf_perspective: LeafPerspective::Leaf,
        });

        assert!(matches!(
            searcher.search(&board),
            Err(EngineError::SearchTimeout { .. })
        ));
    }

    #[test]
    fn depth_one_scores_children_for_their_own_mover() {
        let board = Board::new(Color::Black);
        let mut searcher = Searcher::new(config(1, AgentType::Greedy));

        let outcome = searcher.search(&board).unwrap();

        // Every opening move leaves white 1 to 4; (4,2) comes first.
        assert_eq!(outcome.best_move, Some(Move::Place(Position { col: 4, row: 2 })));
        assert_eq!(outcome.value, -3.0);
        assert_eq!(outcome.nodes, 5);
    }

    #[test]
    fn depth_one_scores_children_for_the_root_mover() {
        let board = Board::new(Color::Black);
        let mut searcher = Searcher::new(SearchConfig {
            leaf_perspective: LeafPerspective::Root,
            ..config(1, AgentType::Greedy)
        });

        let outcome = searcher.search(&board).unwrap();

        assert_eq!(outcome.best_move, Some(Move::Place(Position { col: 4, row: 2 })));
        assert_eq!(outcome.value, 3.0);
        assert_eq!(outcome.nodes, 5);
    }

    #[test]
    fn pruned_value_matches_full_minimax() {
        for perspective in [LeafPerspective::Leaf, LeafPerspective::Root] {
            let mut board = Board::new(Color::Black);
            for max_depth in 1..=4 {
                let mut searcher = Searcher::new(SearchConfig {
                    leaf_perspective: perspective,
                    ..config(max_depth, AgentType::Greedy)
                });
                let outcome = searcher.search(&board).unwrap();

                let root = (perspective == LeafPerspective::Root).then_some(board.turn());
                assert_eq!(
                    outcome.value,
                    minimax(&board, 0, max_depth, true, root),
                    "{perspective:?} depth {max_depth}"
                );
                let mv = outcome.best_move.unwrap();
                assert!(board.legal_moves().contains(&mv.position().unwrap()));
                board = board.execute_move(mv);
            }
        }
    }

    #[test]
    fn recurse_policy_passes_when_mover_is_stuck() {
        let board = pass_configuration_board();

        let leaf = Searcher::new(config(1, AgentType::Greedy))
            .search(&board)
            .unwrap();
        let root = Searcher::new(SearchConfig {
            leaf_perspective: LeafPerspective::Root,
            ..config(1, AgentType::Greedy)
        })
        .search(&board)
        .unwrap();

        assert_eq!(leaf.best_move, Some(Move::Pass));
        assert_eq!(leaf.value, 24.0 - 13.0);
        assert_eq!(root.best_move, Some(Move::Pass));
        assert_eq!(root.value, 13.0 - 24.0);
    }

    #[test]
    fn recurse_policy_searches_past_the_pass() {
        let board = pass_configuration_board();
        let mut searcher = Searcher::new(config(2, AgentType::Greedy));

        let outcome = searcher.search(&board).unwrap();

        assert_eq!(outcome.best_move, Some(Move::Pass));
        assert_eq!(outcome.value, minimax(&board, 0, 2, true, None));
        assert!(outcome.value < -11.0);
    }

    #[test]
    fn skip_policy_backs_up_the_untouched_bound() {
        let board = pass_configuration_board();
        let mut searcher = Searcher::new(SearchConfig {
            pass_policy: PassPolicy::Skip,
            ..config(3, AgentType::Greedy)
        });

        let outcome = searcher.search(&board).unwrap();

        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.value, f64::NEG_INFINITY);
        assert_eq!(outcome.nodes, 1);
    }

    #[test]
    fn finished_game_is_a_cutoff_at_any_depth() {
        let black = (1u64 << 33) - 1;
        let board = Board::from_bitboards(black, !black, Color::White);

        let outcome =
            find_best_move(&board, 4, Duration::from_secs(5), AgentType::Greedy).unwrap();

        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.value, 31.0 - 33.0);
    }

    #[test]
    fn searcher_resets_between_calls() {
        let board = Board::new(Color::Black);
        let mut searcher = Searcher::new(config(2, AgentType::Mobility));

        let first = searcher.search(&board).unwrap();
        let second = searcher.search(&board).unwrap();

        assert_eq!(first, second);
        assert_eq!(searcher.config().max_depth, 2);
    }
}
