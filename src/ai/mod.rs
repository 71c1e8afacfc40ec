pub mod heuristics;
pub mod search;

pub use heuristics::AgentType;
pub use search::{
    LeafPerspective, PassPolicy, SearchConfig, SearchOutcome, Searcher, find_best_move,
};
