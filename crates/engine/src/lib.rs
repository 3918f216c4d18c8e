//! Chess rules: board representation, legal move generation, make/undo,
//! game status, FEN, perft and a game transcript.

pub mod bitboard;
pub mod board;
pub mod error;
pub mod logger;
pub mod perft;
pub mod types;

pub use board::Board;
pub use error::{BoardError, BoardResult};
pub use logger::GameLog;
pub use perft::*;
pub use types::*;
