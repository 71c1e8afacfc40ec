//! AI-vs-AI series runner used by the console binary.
//!
//! One game is played per level in `min_level..=max_level`, the level doubling
//! as the search depth of both agents.

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{debug, info, warn};
use web_time::Instant;

use crate::ai::heuristics::AgentType;
use crate::ai::search::{LeafPerspective, PassPolicy, SearchConfig, Searcher};
use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::types::{Cell, Color, Move, moves_string};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 6;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 60;
/// Consecutive timeout passes after which a game is abandoned.
const MAX_FALLBACK_PASSES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    pub black: AgentType,
    pub white: AgentType,
    pub min_level: u8,
    pub max_level: u8,
    /// Budget for every single move.
    pub timeout: Duration,
    pub pass_policy: PassPolicy,
    pub leaf_perspective: LeafPerspective,
}

impl RunnerConfig {
    pub fn levels(&self) -> RangeInclusive<u8> {
        self.min_level..=self.max_level
    }

    fn agent(&self, color: Color) -> AgentType {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub level: u8,
    pub black_score: u8,
    pub white_score: u8,
    /// `None` for a tie or a stalled game.
    pub winner: Option<Color>,
    pub plies: u32,
    /// Moves replaced by a pass after a search timeout.
    pub timeouts: u32,
    /// Abandoned after consecutive timeout passes; scores are the disc counts
    /// at that point.
    pub stalled: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesReport {
    pub games: Vec<GameRecord>,
    pub black_wins: u32,
    pub white_wins: u32,
    pub ties: u32,
    pub stalled: u32,
}

impl SeriesReport {
    fn record(&mut self, game: GameRecord) {
        match (game.stalled, game.winner) {
            (true, _) => self.stalled += 1,
            (false, Some(Color::Black)) => self.black_wins += 1,
            (false, Some(Color::White)) => self.white_wins += 1,
            (false, None) => self.ties += 1,
        }
        self.games.push(game);
    }
}

pub struct SeriesRunner {
    config: RunnerConfig,
}

impl SeriesRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn play_series(&self) -> EngineResult<SeriesReport> {
        let RunnerConfig {
            black,
            white,
            min_level,
            max_level,
            ..
        } = self.config;
        if black == white {
            info!(
                "Running games using two {black} players with levels from '{min_level}' to \
                 '{max_level}'"
            );
        } else {
            info!(
                "Running games using one {black} player (BLACK) and one {white} player (WHITE) \
                 with levels from '{min_level}' to '{max_level}'"
            );
        }
        info!("Move time-out value is {:?}", self.config.timeout);

        let mut report = SeriesReport::default();
        for level in self.config.levels() {
            report.record(self.play_game(level)?);
        }

        info!("Final results:");
        info!("\t{:23} {}", "Number of black wins:", report.black_wins);
        info!("\t{:23} {}", "Number of white wins:", report.white_wins);
        info!("\t{:23} {}", "Number of ties:", report.ties);
        if report.stalled > 0 {
            info!("\t{:23} {}", "Number of stalled games:", report.stalled);
        }
        Ok(report)
    }

    /// Plays one game with both agents searching `level` plies deep.
    ///
    /// A timed-out search is replaced by a pass so the series keeps running.
    /// Two such passes in a row end the game early as stalled.
    pub fn play_game(&self, level: u8) -> EngineResult<GameRecord> {
        let start = Instant::now();
        let mut board = Board::new(Color::Black);
        let mut plies = 0u32;
        let mut timeouts = 0u32;
        let mut fallback_streak = 0u32;
        let mut stalled = false;

        debug!("+++++++++++ Board Progression +++++++++++");
        while !board.is_game_over() {
            let legal = board.legal_moves();
            debug!("{} to move, legal moves: {}", board.turn(), moves_string(&legal));
            let mut searcher = Searcher::new(SearchConfig {
                max_depth: level,
                timeout: self.config.timeout,
                agent: self.config.agent(board.turn()),
                pass_policy: self.config.pass_policy,
                leaf_perspective: self.config.leaf_perspective,
            });

            let mv = match searcher.search(&board) {
                Ok(outcome) => {
                    fallback_streak = 0;
                    outcome
                        .best_move
                        .or_else(|| legal.first().copied().map(Move::Place))
                        .unwrap_or(Move::Pass)
                }
                Err(EngineError::SearchTimeout { budget }) => {
                    timeouts += 1;
                    fallback_streak += 1;
                    warn!(player = %board.turn(), ?budget, "search timed out, passing instead");
                    if fallback_streak >= MAX_FALLBACK_PASSES {
                        stalled = true;
                        break;
                    }
                    Move::Pass
                }
                Err(err) => return Err(err),
            };

            board = board.execute_move(mv);
            plies += 1;
            debug!("------- Move {plies:3} ({mv}) ------\n{board}");
        }
        debug!("-----------------------------------------");

        let elapsed = start.elapsed();
        if stalled {
            warn!(level, plies, "game abandoned after {MAX_FALLBACK_PASSES} consecutive timeouts");
            return Ok(GameRecord {
                level,
                black_score: board.count(Cell::Black),
                white_score: board.count(Cell::White),
                winner: None,
                plies,
                timeouts,
                stalled,
                elapsed,
            });
        }

        let (black_score, white_score) = board.final_score();
        let winner = match black_score.cmp(&white_score) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        };

        match winner {
            Some(color) => {
                let (won, lost) = if color.is_black() {
                    (black_score, white_score)
                } else {
                    (white_score, black_score)
                };
                info!(
                    "Running game with level: '{level}': '{color}' defeats '{}'. \
                     Score: {won:2} to {lost:2} (time: {:7.3}s)",
                    color.opponent(),
                    elapsed.as_secs_f64()
                );
            }
            None => info!(
                "Running game with level: '{level}': The game was a tie (time: {:7.3}s)",
                elapsed.as_secs_f64()
            ),
        }

        Ok(GameRecord {
            level,
            black_score,
            white_score,
            winner,
            plies,
            timeouts,
            stalled,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(black: AgentType, white: AgentType, levels: RangeInclusive<u8>) -> RunnerConfig {
        RunnerConfig {
            black,
            white,
            min_level: *levels.start(),
            max_level: *levels.end(),
            timeout: Duration::from_secs(30),
            pass_policy: PassPolicy::Recurse,
            leaf_perspective: LeafPerspective::Leaf,
        }
    }

    #[test]
    fn series_plays_one_game_per_level() {
        let runner = SeriesRunner::new(config(AgentType::Greedy, AgentType::Composite, 1..=2));

        let report = runner.play_series().unwrap();

        assert_eq!(report.games.len(), 2);
        assert_eq!(report.black_wins + report.white_wins + report.ties, 2);
        for (game, level) in report.games.iter().zip(1..) {
            assert_eq!(game.level, level);
            assert_eq!(game.black_score as u32 + game.white_score as u32, 64);
            assert_eq!(game.timeouts, 0);
            assert!(!game.stalled);
            assert!(game.plies >= 4);
        }
    }

    #[test]
    fn identical_agents_replay_the_same_game() {
        let runner = SeriesRunner::new(config(AgentType::Corner, AgentType::Corner, 1..=1));

        let first = runner.play_game(1).unwrap();
        let second = runner.play_game(1).unwrap();

        assert_eq!(first.black_score, second.black_score);
        assert_eq!(first.plies, second.plies);
    }

    #[test]
    fn winner_matches_the_score() {
        let runner =
            SeriesRunner::new(config(AgentType::GreedyCorner, AgentType::FlipGreedy, 1..=1));

        let game = runner.play_game(1).unwrap();

        match game.winner {
            Some(Color::Black) => assert!(game.black_score > game.white_score),
            Some(Color::White) => assert!(game.white_score > game.black_score),
            None => assert_eq!(game.black_score, game.white_score),
        }
    }

    #[test]
    fn constant_timeouts_stall_the_game() {
        let runner = SeriesRunner::new(RunnerConfig {
            timeout: Duration::ZERO,
            ..config(AgentType::Greedy, AgentType::Greedy, 1..=1)
        });

        let game = runner.play_game(1).unwrap();

        assert!(game.stalled);
        assert_eq!(game.winner, None);
        assert_eq!(game.plies, 1);
        assert_eq!(game.timeouts, 2);
        assert_eq!((game.black_score, game.white_score), (2, 2));
    }

    #[test]
    fn stalled_games_do_not_end_the_series() {
        let runner = SeriesRunner::new(RunnerConfig {
            timeout: Duration::ZERO,
            ..config(AgentType::Composite, AgentType::Mobility, 1..=3)
        });

        let report = runner.play_series().unwrap();

        assert_eq!(report.games.len(), 3);
        assert_eq!(report.stalled, 3);
        assert_eq!(report.black_wins + report.white_wins + report.ties, 0);
        let levels: Vec<u8> = report.games.iter().map(|game| game.level).collect();
        assert_eq!(levels, [1, 2, 3]);
    }

    #[test]
    fn skip_policy_still_finishes_games() {
        let runner = SeriesRunner::new(RunnerConfig {
            pass_policy: PassPolicy::Skip,
            ..config(AgentType::MobileGreedy, AgentType::Mobility, 2..=2)
        });

        let game = runner.play_game(2).unwrap();
        assert_eq!(game.black_score as u32 + game.white_score as u32, 64);
    }
}
