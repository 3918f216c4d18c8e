use super::validation::{find_king_in, is_square_attacked, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use super::Board;
use crate::bitboard::{get_king_attacks, get_knight_attacks, index_to_square, iterate_bits};
use crate::types::*;

const PROMOTION_PIECES: [u8; 4] = [QUEEN, ROOK, BISHOP, KNIGHT];

impl Board {
    /// Generate all legal moves for the current player.
    ///
    /// Pieces are visited in ascending square order, so the result is
    /// deterministic for a given position.
    pub fn get_all_legal_moves(&self) -> Vec<Move> {
        let mut all_moves = Vec::new();
        let our_pieces = self.bitboards().get_all_pieces(self.current_turn);

        for square_index in iterate_bits(our_pieces) {
            all_moves.extend(self.get_legal_moves(index_to_square(square_index)));
        }

        all_moves
    }

    /// Legal moves for the piece on `square`, promotions expanded to Q, R, B, N.
    pub fn get_legal_moves(&self, square: Square) -> Vec<Move> {
        let piece = self.get_piece(square);
        if !is_piece_color(piece, self.current_turn) {
            return Vec::new();
        }

        let promotion_rank = if self.current_turn == WHITE { 7 } else { 0 };
        let mut moves = Vec::new();
        for target in self.get_pseudo_legal_moves(square) {
            if piece_type(piece) == PAWN && target.rank() == promotion_rank {
                moves.extend(PROMOTION_PIECES.iter().map(|&promotion| Move::new_promotion(square, target, promotion)));
            } else {
                moves.push(Move::new(square, target));
            }
        }

        moves.retain(|&mv| self.leaves_king_safe(mv));
        moves
    }

    /// Destination squares that follow the piece's movement rules, ignoring
    /// whether the mover's king ends up attacked.
    pub fn get_pseudo_legal_moves(&self, square: Square) -> Vec<Square> {
        let piece = self.get_piece(square);
        if is_empty(piece) {
            return Vec::new();
        }

        let color = piece_color(piece);
        match piece_type(piece) {
            PAWN => self.get_pawn_moves(square, color),
            KNIGHT => self.get_knight_moves(square, color),
            BISHOP => self.get_sliding_moves(square, color, &BISHOP_DIRECTIONS),
            ROOK => self.get_sliding_moves(square, color, &ROOK_DIRECTIONS),
            QUEEN => {
                let mut moves = self.get_sliding_moves(square, color, &ROOK_DIRECTIONS);
                moves.extend(self.get_sliding_moves(square, color, &BISHOP_DIRECTIONS));
                moves
            }
            KING => self.get_king_moves(square, color),
            _ => Vec::new(),
        }
    }

    fn get_pawn_moves(&self, square: Square, color: u8) -> Vec<Square> {
        let mut moves = Vec::new();
        let (direction, start_rank) = if color == WHITE { (1, 1) } else { (-1, 6) };

        if let Some(one_step) = square.offset(0, direction) {
            if is_empty(self.get_piece(one_step)) {
                moves.push(one_step);

                if square.rank() == start_rank {
                    if let Some(two_step) = square.offset(0, 2 * direction) {
                        if is_empty(self.get_piece(two_step)) {
                            moves.push(two_step);
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(target) = square.offset(df, direction) else {
                continue;
            };
            if is_piece_color(self.get_piece(target), opposite_color(color)) {
                moves.push(target);
            } else if self.is_en_passant_move(Move::new(square, target)) {
                moves.push(target);
            }
        }

        moves
    }

    fn get_knight_moves(&self, square: Square, color: u8) -> Vec<Square> {
        iterate_bits(get_knight_attacks(square.0))
            .map(index_to_square)
            .filter(|&target| !is_piece_color(self.get_piece(target), color))
            .collect()
    }

    fn get_king_moves(&self, square: Square, color: u8) -> Vec<Square> {
        let mut moves: Vec<Square> = iterate_bits(get_king_attacks(square.0))
            .map(index_to_square)
            .filter(|&target| !is_piece_color(self.get_piece(target), color))
            .collect();

        if self.can_castle(color, true) {
            moves.push(Square::new(6, square.rank()));
        }
        if self.can_castle(color, false) {
            moves.push(Square::new(2, square.rank()));
        }

        moves
    }

    fn get_sliding_moves(&self, square: Square, color: u8, directions: &[(i8, i8)]) -> Vec<Square> {
        let mut moves = Vec::new();
        for &(df, dr) in directions {
            let mut current = square;
            while let Some(next) = current.offset(df, dr) {
                let occupant = self.get_piece(next);
                if is_empty(occupant) {
                    moves.push(next);
                } else {
                    if !is_piece_color(occupant, color) {
                        moves.push(next);
                    }
                    break;
                }
                current = next;
            }
        }
        moves
    }

    /// Pawn capture onto the current en passant target.
    pub fn is_en_passant_move(&self, mv: Move) -> bool {
        let piece = self.get_piece(mv.from);
        if piece_type(piece) != PAWN || mv.from.file() == mv.to.file() {
            return false;
        }
        match (self.en_passant_target, self.en_passant_pawn) {
            (Some(target), Some(pawn_square)) => {
                target == mv.to && is_piece_color(self.get_piece(pawn_square), opposite_color(piece_color(piece)))
            }
            _ => false,
        }
    }

    /// King move of two files along the home rank.
    pub fn is_castling_move(&self, mv: Move) -> bool {
        piece_type(self.get_piece(mv.from)) == KING && mv.from.file().abs_diff(mv.to.file()) == 2
    }

    pub fn can_castle(&self, color: u8, kingside: bool) -> bool {
        let right = match (color == WHITE, kingside) {
            (true, true) => WHITE_KINGSIDE,
            (true, false) => WHITE_QUEENSIDE,
            (false, true) => BLACK_KINGSIDE,
            (false, false) => BLACK_QUEENSIDE,
        };
        if !has_castling_right(self.castling_rights, right) {
            return false;
        }

        let rank = if color == WHITE { 0 } else { 7 };
        let king_square = Square::new(4, rank);
        let rook_square = Square::new(if kingside { 7 } else { 0 }, rank);
        if self.get_piece(king_square) != make_piece(KING, color)
            || self.get_piece(rook_square) != make_piece(ROOK, color)
        {
            return false;
        }

        let between: &[u8] = if kingside { &[5, 6] } else { &[1, 2, 3] };
        if between.iter().any(|&file| !is_empty(self.get_piece(Square::new(file, rank)))) {
            return false;
        }

        // King may not start on, pass through or land on an attacked square
        let transit: [u8; 3] = if kingside { [4, 5, 6] } else { [4, 3, 2] };
        let enemy = opposite_color(color);
        transit.iter().all(|&file| !self.is_under_threat(Square::new(file, rank), enemy))
    }

    /// Play `mv` on a scratch copy of the squares and check the mover's king.
    fn leaves_king_safe(&self, mv: Move) -> bool {
        let mut squares = *self.squares();
        let piece = squares[mv.from.0 as usize];
        let color = piece_color(piece);

        if self.is_en_passant_move(mv) {
            if let Some(pawn_square) = self.en_passant_pawn {
                squares[pawn_square.0 as usize] = EMPTY;
            }
        }
        if self.is_castling_move(mv) {
            let (rook_from, rook_to) = castling_rook_squares(mv);
            squares[rook_to.0 as usize] = squares[rook_from.0 as usize];
            squares[rook_from.0 as usize] = EMPTY;
        }

        squares[mv.from.0 as usize] = EMPTY;
        squares[mv.to.0 as usize] = mv.promotion.map_or(piece, |promotion| make_piece(promotion, color));

        match find_king_in(&squares, color) {
            Some(king) => !is_square_attacked(&squares, king, opposite_color(color)),
            None => false,
        }
    }
}

/// Rook origin and destination for a castling king move.
pub(crate) fn castling_rook_squares(king_move: Move) -> (Square, Square) {
    let rank = king_move.from.rank();
    if king_move.to.file() > king_move.from.file() {
        (Square::new(7, rank), Square::new(5, rank))
    } else {
        (Square::new(0, rank), Square::new(3, rank))
    }
}
