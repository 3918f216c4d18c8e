use super::Board;
use crate::bitboard::{get_king_attacks, get_knight_attacks, iterate_bits};
use crate::types::*;
use std::ops::ControlFlow;

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// First occupied square along a ray, not counting the origin.
fn cast_ray(squares: &[Piece; 64], origin: Square, df: i8, dr: i8) -> Option<(Square, Piece)> {
    let mut current = origin;
    while let Some(next) = current.offset(df, dr) {
        let piece = squares[next.0 as usize];
        if !is_empty(piece) {
            return Some((next, piece));
        }
        current = next;
    }
    None
}

/// Calls `visit` once per piece of `by_color` that attacks `target`.
fn scan_attackers<F>(squares: &[Piece; 64], target: Square, by_color: u8, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Square) -> ControlFlow<()>,
{
    // An attacking pawn sits one rank behind the target from its own side
    let pawn_rank_delta = if by_color == WHITE { -1 } else { 1 };
    let pawn = make_piece(PAWN, by_color);
    for df in [-1, 1] {
        if let Some(from) = target.offset(df, pawn_rank_delta) {
            if squares[from.0 as usize] == pawn {
                visit(from)?;
            }
        }
    }

    let knight = make_piece(KNIGHT, by_color);
    for index in iterate_bits(get_knight_attacks(target.0)) {
        if squares[index as usize] == knight {
            visit(Square(index))?;
        }
    }

    let king = make_piece(KING, by_color);
    for index in iterate_bits(get_king_attacks(target.0)) {
        if squares[index as usize] == king {
            visit(Square(index))?;
        }
    }

    let queen = make_piece(QUEEN, by_color);
    for (directions, slider) in [(ROOK_DIRECTIONS, ROOK), (BISHOP_DIRECTIONS, BISHOP)] {
        let slider = make_piece(slider, by_color);
        for (df, dr) in directions {
            if let Some((from, piece)) = cast_ray(squares, target, df, dr) {
                if piece == slider || piece == queen {
                    visit(from)?;
                }
            }
        }
    }

    ControlFlow::Continue(())
}

pub fn is_square_attacked(squares: &[Piece; 64], target: Square, by_color: u8) -> bool {
    scan_attackers(squares, target, by_color, |_| ControlFlow::Break(())).is_break()
}

pub fn count_attackers(squares: &[Piece; 64], target: Square, by_color: u8) -> u32 {
    let mut count = 0;
    let _ = scan_attackers(squares, target, by_color, |_| {
        count += 1;
        ControlFlow::Continue(())
    });
    count
}

pub(crate) fn find_king_in(squares: &[Piece; 64], color: u8) -> Option<Square> {
    let king = make_piece(KING, color);
    squares.iter().position(|&piece| piece == king).map(|index| Square(index as u8))
}

impl Board {
    /// Check if a move is in the current legal move list
    pub fn is_valid_move(&self, mv: Move) -> bool {
        let from_piece = self.get_piece(mv.from);
        if !is_piece_color(from_piece, self.current_turn) {
            return false;
        }
        self.get_legal_moves(mv.from).contains(&mv)
    }

    /// Check if a square is attacked by the specified color
    pub fn is_under_threat(&self, square: Square, by_color: u8) -> bool {
        is_square_attacked(self.squares(), square, by_color)
    }

    /// Number of `by_color` pieces directly attacking `square`. Pins are ignored.
    pub fn attackers_of(&self, square: Square, by_color: u8) -> u32 {
        count_attackers(self.squares(), square, by_color)
    }

    pub fn find_king(&self, color: u8) -> Option<Square> {
        self.bitboards().find_pieces(color, KING).first().copied()
    }

    pub fn is_in_check(&self, color: u8) -> bool {
        self.find_king(color)
            .is_some_and(|king| self.is_under_threat(king, opposite_color(color)))
    }

    /// True when neither side can possibly deliver mate.
    pub fn has_insufficient_material(&self) -> bool {
        let bitboards = self.bitboards();
        let mating_material = [WHITE, BLACK]
            .into_iter()
            .any(|color| [PAWN, ROOK, QUEEN].into_iter().any(|kind| bitboards.count_pieces(color, kind) > 0));
        if mating_material {
            return false;
        }

        let mut minors = Vec::new();
        for color in [WHITE, BLACK] {
            for square in self.occupied_squares(color) {
                let kind = piece_type(self.get_piece(square));
                if kind != KING {
                    minors.push((square, kind));
                }
            }
        }

        match minors.as_slice() {
            [] | [_] => true,
            // Bishops only, all on the same square colour
            many => {
                let shade = |square: &Square| (square.file() + square.rank()) % 2;
                many.iter().all(|(_, kind)| *kind == BISHOP)
                    && many.iter().all(|(square, _)| shade(square) == shade(&many[0].0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn pawn_attacks_point_forward() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.is_under_threat(sq("d5"), WHITE));
        assert!(board.is_under_threat(sq("e4"), BLACK));
        assert!(!board.is_under_threat(sq("e5"), WHITE));
    }

    #[test]
    fn sliders_are_blocked() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/R3K2r w - - 0 1").unwrap();
        assert!(board.is_under_threat(sq("e1"), BLACK));
        assert!(board.is_in_check(WHITE));
        assert!(!board.is_under_threat(sq("e8"), WHITE));
    }

    #[test]
    fn attackers_are_counted() {
        // d5 pawn is hit by the e4 pawn, the c3 knight and the d1 rook
        let board = Board::from_fen("4k3/8/8/3p4/4P3/2N5/8/3RK3 w - - 0 1").unwrap();
        assert_eq!(board.attackers_of(sq("d5"), WHITE), 3);
        assert_eq!(board.attackers_of(sq("e4"), BLACK), 1);
    }

    #[test]
    fn insufficient_material_cases() {
        let kings = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(kings.has_insufficient_material());

        let knight = Board::from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1").unwrap();
        assert!(knight.has_insufficient_material());

        let same_shade_bishops = Board::from_fen("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(same_shade_bishops.has_insufficient_material());

        let rook = Board::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").unwrap();
        assert!(!rook.has_insufficient_material());

        for fen in ["4k3/p7/8/8/8/8/8/4K3 w - - 0 1", "4k3/8/8/8/8/8/8/3QK3 w - - 0 1", "4kn2/8/8/8/8/8/8/2B1K3 w - - 0 1"] {
            assert!(!Board::from_fen(fen).unwrap().has_insufficient_material(), "{}", fen);
        }
    }
}
