use super::moves::castling_rook_squares;
use super::Board;
use crate::error::{BoardError, BoardResult};
use crate::types::*;

impl Board {
    /// Execute a move if it is legal in the current position.
    pub fn try_make_move(&mut self, mv: Move) -> BoardResult<GameMove> {
        if !self.is_valid_move(mv) {
            return Err(BoardError::IllegalMove { mv });
        }
        Ok(self.make_move_unchecked(mv))
    }

    /// Execute a move already known to be legal (taken from the legal move list).
    pub(crate) fn make_move_unchecked(&mut self, mv: Move) -> GameMove {
        let moving_piece = self.get_piece(mv.from);
        let color = piece_color(moving_piece);

        // Special moves are detected before the en passant state is cleared
        let is_castling = self.is_castling_move(mv);
        let is_en_passant = self.is_en_passant_move(mv);
        let captured_piece = match (is_en_passant, self.en_passant_pawn) {
            (true, Some(pawn_square)) => self.get_piece(pawn_square),
            _ => self.get_piece(mv.to),
        };

        let game_move = GameMove {
            mv,
            moved_piece: moving_piece,
            captured_piece,
            promotion: mv.promotion,
            is_castling,
            is_en_passant,
            previous_castling_rights: self.castling_rights,
            previous_en_passant_target: self.en_passant_target,
            previous_en_passant_pawn: self.en_passant_pawn,
            previous_half_move_clock: self.half_move_clock,
            previous_full_move_number: self.full_move_number,
        };

        if is_en_passant {
            self.execute_en_passant_capture();
        }
        if is_castling {
            let (rook_from, rook_to) = castling_rook_squares(mv);
            let rook = self.get_piece(rook_from);
            self.set_piece(rook_from, EMPTY);
            self.set_piece(rook_to, rook);
        }

        self.set_piece(mv.from, EMPTY);
        let placed = mv.promotion.map_or(moving_piece, |promotion| make_piece(promotion, color));
        self.set_piece(mv.to, placed);

        self.update_castling_rights(mv, moving_piece);
        self.setup_en_passant(mv, moving_piece);

        if piece_type(moving_piece) == PAWN || !is_empty(captured_piece) {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock = self.half_move_clock.saturating_add(1);
        }
        if color == BLACK {
            self.full_move_number = self.full_move_number.saturating_add(1);
        }

        self.current_turn = opposite_color(color);
        self.move_history.push(game_move.clone());
        game_move
    }

    fn execute_en_passant_capture(&mut self) {
        if let Some(pawn_square) = self.en_passant_pawn {
            self.set_piece(pawn_square, EMPTY);
        }
    }

    /// Drop rights for a king move, and for any rook leaving or being captured on its corner.
    fn update_castling_rights(&mut self, mv: Move, moving_piece: Piece) {
        if piece_type(moving_piece) == KING {
            let lost = get_castling_rights_for_color(ALL_CASTLING_RIGHTS, piece_color(moving_piece));
            remove_castling_right(&mut self.castling_rights, lost);
        }

        for square in [mv.from, mv.to] {
            let right = match (square.file(), square.rank()) {
                (0, 0) => WHITE_QUEENSIDE,
                (7, 0) => WHITE_KINGSIDE,
                (0, 7) => BLACK_QUEENSIDE,
                (7, 7) => BLACK_KINGSIDE,
                _ => continue,
            };
            remove_castling_right(&mut self.castling_rights, right);
        }
    }

    fn setup_en_passant(&mut self, mv: Move, moving_piece: Piece) {
        let is_double_push = piece_type(moving_piece) == PAWN && mv.from.rank().abs_diff(mv.to.rank()) == 2;
        if is_double_push {
            let skipped_rank = (mv.from.rank() + mv.to.rank()) / 2;
            self.en_passant_target = Some(Square::new(mv.from.file(), skipped_rank));
            self.en_passant_pawn = Some(mv.to);
        } else {
            self.en_passant_target = None;
            self.en_passant_pawn = None;
        }
    }

    /// Take back the last move, restoring the position exactly.
    pub fn undo_move(&mut self) -> BoardResult<GameMove> {
        let game_move = self.move_history.pop().ok_or(BoardError::NothingToUndo)?;
        let mv = game_move.mv;

        self.set_piece(mv.to, EMPTY);
        self.set_piece(mv.from, game_move.moved_piece);

        if game_move.is_en_passant {
            if let Some(pawn_square) = game_move.previous_en_passant_pawn {
                self.set_piece(pawn_square, game_move.captured_piece);
            }
        } else {
            self.set_piece(mv.to, game_move.captured_piece);
        }

        if game_move.is_castling {
            let (rook_from, rook_to) = castling_rook_squares(mv);
            let rook = self.get_piece(rook_to);
            self.set_piece(rook_to, EMPTY);
            self.set_piece(rook_from, rook);
        }

        self.castling_rights = game_move.previous_castling_rights;
        self.en_passant_target = game_move.previous_en_passant_target;
        self.en_passant_pawn = game_move.previous_en_passant_pawn;
        self.half_move_clock = game_move.previous_half_move_clock;
        self.full_move_number = game_move.previous_full_move_number;
        self.current_turn = game_move.mover();

        Ok(game_move)
    }

    pub fn game_status(&self) -> GameStatus {
        if self.get_all_legal_moves().is_empty() {
            return if self.is_in_check(self.current_turn) {
                GameStatus::Checkmate(self.current_turn)
            } else {
                GameStatus::Stalemate
            };
        }

        if self.half_move_clock >= 100 {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.has_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else {
            GameStatus::InProgress
        }
    }
}
