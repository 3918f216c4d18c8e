//! Alpha-beta game-tree search and heuristic evaluation for chess.
//!
//! The search runs against any [`RulesEngine`]; [`engine::Board`] is the
//! stock implementation and [`EngineSession`] ties the two together.

pub mod error;
pub mod evaluation;
pub mod rules;
pub mod search;
pub mod session;
pub mod types;

pub use error::{SearchError, SearchResult};
pub use evaluation::*;
pub use rules::RulesEngine;
pub use search::SearchEngine;
pub use session::{BenchmarkReport, EngineSession};
pub use types::*;
