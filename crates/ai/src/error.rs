//! Errors that abort a search

use thiserror::Error;

type RulesError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// The rules engine refused a move taken from its own legal move list
    #[error("rules engine rejected move {mv}")]
    IllegalMove {
        mv: String,
        #[source]
        source: RulesError,
    },

    /// Rewinding the rules engine failed, so its state no longer matches the search
    #[error("undo failed after {mv}")]
    UnbalancedUndo {
        mv: String,
        #[source]
        source: RulesError,
    },

    #[error("search depth {requested} exceeds the maximum of {max}")]
    DepthTooLarge { requested: u32, max: u32 },
}

pub type SearchResult<T> = Result<T, SearchError>;
