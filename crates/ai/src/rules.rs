//! The narrow view of a game the search needs.

use crate::types::{Outcome, Side};
use engine::{opposite_color, Board, BoardError, GameStatus, Move};
use std::fmt::{Debug, Display};

/// A game state that can be advanced and rewound in place.
///
/// `legal_moves` must enumerate in a fixed order; the search keeps the first
/// of several equally good moves, so the order decides ties.
///
/// Only the search goes through this trait. Positional queries (check,
/// attackers, piece counts, castling rights and history) stay on the
/// concrete state and are reached through [`Evaluator<R>`](crate::Evaluator),
/// so [`HeuristicEvaluator`](crate::HeuristicEvaluator) evaluates
/// [`engine::Board`] while any other `R` brings its own evaluator.
pub trait RulesEngine {
    type Move: Copy + PartialEq + Debug + Display;
    type Error: std::error::Error + Send + Sync + 'static;

    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Play `mv`; fails if it is not currently legal.
    fn execute(&mut self, mv: Self::Move) -> Result<(), Self::Error>;

    /// Take back the last executed move; fails if there is none.
    fn undo(&mut self) -> Result<(), Self::Error>;

    fn outcome(&self) -> Outcome;

    fn side_to_move(&self) -> Side;
}

impl RulesEngine for Board {
    type Move = Move;
    type Error = BoardError;

    fn legal_moves(&self) -> Vec<Move> {
        self.get_all_legal_moves()
    }

    fn execute(&mut self, mv: Move) -> Result<(), BoardError> {
        self.try_make_move(mv).map(|_| ())
    }

    fn undo(&mut self) -> Result<(), BoardError> {
        self.undo_move().map(|_| ())
    }

    fn outcome(&self) -> Outcome {
        match self.game_status() {
            GameStatus::Checkmate(mated) => Outcome::Win(Side::from_color(opposite_color(mated))),
            GameStatus::Stalemate | GameStatus::Draw(_) => Outcome::Draw,
            GameStatus::InProgress => Outcome::InProgress,
        }
    }

    fn side_to_move(&self) -> Side {
        Side::from_color(self.current_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_outcomes_map_to_sides() {
        let fools_mate = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert_eq!(fools_mate.outcome(), Outcome::Win(Side::Black));
        assert_eq!(fools_mate.side_to_move(), Side::White);

        let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.outcome(), Outcome::Draw);

        assert_eq!(Board::new().outcome(), Outcome::InProgress);
    }

    #[test]
    fn execute_and_undo_go_through_the_board() {
        let mut board = Board::new();
        let mv = Move::from_uci("e2e4").unwrap();
        board.execute(mv).unwrap();
        assert_eq!(board.side_to_move(), Side::Black);
        board.undo().unwrap();
        assert_eq!(board.to_fen(), engine::STARTING_FEN);

        assert!(board.execute(Move::from_uci("e2e5").unwrap()).is_err());
        assert_eq!(board.undo(), Err(BoardError::NothingToUndo));
    }
}
