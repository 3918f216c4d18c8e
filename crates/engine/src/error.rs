//! Error types for board operations

use crate::types::Move;
use thiserror::Error;

/// Errors raised by the board when asked to do something the rules forbid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Move is not in the current legal move list
    #[error("illegal move {mv} in the current position")]
    IllegalMove { mv: Move },

    /// `undo_move` called with an empty history
    #[error("no moves to undo")]
    NothingToUndo,

    /// FEN string could not be parsed
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

pub type BoardResult<T> = Result<T, BoardError>;
