//! Runs a series of Othello games between two agents, one game per level.
//!
//! ```text
//! othello -b composite -w greedy --min-level 1 --max-level 4 -t 10
//! othello -bp composite -wp greedy -min 1 -max 4 --time_out 10
//! ```
//!
//! Set `RUST_LOG=debug` to log the board after every move.

use std::time::Duration;

use anyhow::{Context, bail, ensure};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use othello_engine::ai::{AgentType, LeafPerspective, PassPolicy};
use othello_engine::runner::{
    MAX_LEVEL, MAX_TIMEOUT_SECS, MIN_LEVEL, MIN_TIMEOUT_SECS, RunnerConfig, SeriesRunner,
};

/// Single-dash long flags accepted for compatibility with older scripts.
const LEGACY_FLAGS: [(&str, &str); 4] =
    [("-bp", "--bp"), ("-wp", "--wp"), ("-min", "--min"), ("-max", "--max")];

/// Program to run a series of Othello games with specified features
#[derive(Debug, Parser)]
#[command(name = "othello")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Type of the black player
    #[arg(short = 'b', long, value_enum, visible_aliases = ["bp", "black_player"])]
    black_player: Option<AgentType>,

    /// Type of the white player
    #[arg(short = 'w', long, value_enum, visible_aliases = ["wp", "white_player"])]
    white_player: Option<AgentType>,

    /// Minimum level (search depth) to start with
    #[arg(
        long,
        visible_aliases = ["min", "min_level"],
        default_value_t = MIN_LEVEL,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_LEVEL)..=i64::from(MAX_LEVEL))
    )]
    min_level: u8,

    /// Maximum level (search depth) to reach
    #[arg(
        long,
        visible_aliases = ["max", "max_level"],
        default_value_t = MIN_LEVEL,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_LEVEL)..=i64::from(MAX_LEVEL))
    )]
    max_level: u8,

    /// Time-out value in seconds for each move
    #[arg(
        short = 't',
        long = "time-out",
        visible_alias = "time_out",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS)
    )]
    time_out: u64,

    /// Behavior of the search when the side to move has to pass
    #[arg(long, value_enum, default_value = "recurse")]
    pass_policy: PassPolicy,

    /// Side a cutoff position is scored for
    #[arg(long, value_enum, default_value = "leaf")]
    leaf_perspective: LeafPerspective,
}

impl Cli {
    fn runner_config(&self) -> anyhow::Result<RunnerConfig> {
        let (Some(black), Some(white)) = (self.black_player, self.white_player) else {
            bail!("you must specify both player types");
        };
        ensure!(
            self.min_level <= self.max_level,
            "minimum level {} is above maximum level {}",
            self.min_level,
            self.max_level
        );

        Ok(RunnerConfig {
            black,
            white,
            min_level: self.min_level,
            max_level: self.max_level,
            timeout: Duration::from_secs(self.time_out),
            pass_policy: self.pass_policy,
            leaf_perspective: self.leaf_perspective,
        })
    }
}

/// Rewrites `-bp`-style flags into their long aliases; clap shorts are one
/// character.
fn normalize_legacy_flags(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| {
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| *legacy == arg)
                .map_or(arg, |(_, long)| long.to_string())
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args()));
    let runner = SeriesRunner::new(cli.runner_config()?);
    runner.play_series().context("series aborted")?;

    Ok(())
}
