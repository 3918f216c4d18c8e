use crate::bitboard::{count_bits, index_to_square, iterate_bits, BitboardManager};
use crate::error::{BoardError, BoardResult};
use crate::types::*;
use std::fmt;

pub mod moves;
pub mod state;
pub mod validation;

#[derive(Debug, Clone)]
pub struct Board {
    squares: [Piece; 64],
    pub current_turn: u8,
    pub move_history: Vec<GameMove>,
    pub half_move_clock: u16,
    pub full_move_number: u16,
    pub castling_rights: u8,
    pub en_passant_target: Option<Square>,
    pub en_passant_pawn: Option<Square>,
    bitboards: BitboardManager,
}

const BACK_RANK: [u8; 8] = [ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK];

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.castling_rights = ALL_CASTLING_RIGHTS;
        board.setup_starting_position();
        board
    }

    fn empty() -> Self {
        Self {
            squares: [EMPTY; 64],
            current_turn: WHITE,
            move_history: Vec::new(),
            half_move_clock: 0,
            full_move_number: 1,
            castling_rights: 0,
            en_passant_target: None,
            en_passant_pawn: None,
            bitboards: BitboardManager::new(),
        }
    }

    fn setup_starting_position(&mut self) {
        for (file, &piece_type) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            self.set_piece(Square::new(file, 0), make_piece(piece_type, WHITE));
            self.set_piece(Square::new(file, 1), make_piece(PAWN, WHITE));
            self.set_piece(Square::new(file, 6), make_piece(PAWN, BLACK));
            self.set_piece(Square::new(file, 7), make_piece(piece_type, BLACK));
        }
    }

    // Basic board operations
    pub fn get_piece(&self, square: Square) -> Piece {
        self.squares[square.0 as usize]
    }

    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        let old = self.squares[square.0 as usize];
        self.squares[square.0 as usize] = piece;
        self.bitboards.update_square(square, old, piece);
    }

    pub fn squares(&self) -> &[Piece; 64] {
        &self.squares
    }

    pub fn bitboards(&self) -> &BitboardManager {
        &self.bitboards
    }

    /// Parse a FEN string. The clock fields are optional.
    pub fn from_fen(fen: &str) -> BoardResult<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&parts.len()) {
            return Err(BoardError::InvalidFen(format!("expected 4 to 6 fields, found {}", parts.len())));
        }

        let mut board = Self::empty();
        board.parse_piece_placement(parts[0])?;

        board.current_turn = match parts[1] {
            "w" => WHITE,
            "b" => BLACK,
            other => return Err(BoardError::InvalidFen(format!("invalid active color '{}'", other))),
        };

        board.parse_castling_rights(parts[2])?;
        board.parse_en_passant(parts[3])?;

        if let Some(clock) = parts.get(4) {
            board.half_move_clock = clock
                .parse()
                .map_err(|_| BoardError::InvalidFen(format!("invalid halfmove clock '{}'", clock)))?;
        }
        if let Some(number) = parts.get(5) {
            board.full_move_number = number
                .parse()
                .map_err(|_| BoardError::InvalidFen(format!("invalid fullmove number '{}'", number)))?;
        }

        Ok(board)
    }

    fn parse_piece_placement(&mut self, placement: &str) -> BoardResult<()> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(BoardError::InvalidFen("piece placement must have 8 ranks".to_string()));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file = 0u8;

            for ch in rank_str.chars() {
                if let Some(empty_squares) = ch.to_digit(10) {
                    file = Some(empty_squares)
                        .filter(|run| (1..=8).contains(run))
                        .and_then(|run| file.checked_add(run as u8))
                        .filter(|&next| next <= 8)
                        .ok_or_else(|| BoardError::InvalidFen(format!("bad empty-square run in rank {}", rank + 1)))?;
                } else {
                    if file >= 8 {
                        return Err(BoardError::InvalidFen(format!("too many pieces in rank {}", rank + 1)));
                    }
                    let piece = Self::char_to_piece(ch)?;
                    self.set_piece(Square::new(file, rank), piece);
                    file += 1;
                }
            }

            if file != 8 {
                return Err(BoardError::InvalidFen(format!("rank {} does not cover 8 files", rank + 1)));
            }
        }

        Ok(())
    }

    fn char_to_piece(ch: char) -> BoardResult<Piece> {
        let piece_type = match ch.to_ascii_lowercase() {
            'p' => PAWN,
            'n' => KNIGHT,
            'b' => BISHOP,
            'r' => ROOK,
            'q' => QUEEN,
            'k' => KING,
            _ => return Err(BoardError::InvalidFen(format!("unknown piece '{}'", ch))),
        };

        let color = if ch.is_uppercase() { WHITE } else { BLACK };
        Ok(make_piece(piece_type, color))
    }

    fn parse_castling_rights(&mut self, castling_str: &str) -> BoardResult<()> {
        if castling_str == "-" {
            self.castling_rights = 0;
            return Ok(());
        }

        for ch in castling_str.chars() {
            match ch {
                'K' => self.castling_rights |= WHITE_KINGSIDE,
                'Q' => self.castling_rights |= WHITE_QUEENSIDE,
                'k' => self.castling_rights |= BLACK_KINGSIDE,
                'q' => self.castling_rights |= BLACK_QUEENSIDE,
                _ => return Err(BoardError::InvalidFen(format!("invalid castling right '{}'", ch))),
            }
        }

        Ok(())
    }

    fn parse_en_passant(&mut self, en_passant_str: &str) -> BoardResult<()> {
        if en_passant_str == "-" {
            self.en_passant_target = None;
            self.en_passant_pawn = None;
            return Ok(());
        }

        let target = Square::from_algebraic(en_passant_str)
            .filter(|square| square.rank() == 2 || square.rank() == 5)
            .ok_or_else(|| BoardError::InvalidFen(format!("invalid en passant square '{}'", en_passant_str)))?;

        // Target on rank 3 means a white pawn on rank 4 can be taken, and vice versa
        let pawn_rank = if target.rank() == 2 { 3 } else { 4 };
        self.en_passant_target = Some(target);
        self.en_passant_pawn = Some(Square::new(target.file(), pawn_rank));

        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let piece = self.get_piece(Square::new(file, rank));
                if is_empty(piece) {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(piece_to_char(piece));
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let mut castling = String::new();
        for (right, ch) in [(WHITE_KINGSIDE, 'K'), (WHITE_QUEENSIDE, 'Q'), (BLACK_KINGSIDE, 'k'), (BLACK_QUEENSIDE, 'q')] {
            if has_castling_right(self.castling_rights, right) {
                castling.push(ch);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self.en_passant_target.map_or_else(|| "-".to_string(), |square| square.to_string());

        format!(
            "{} {} {} {} {} {}",
            placement,
            if self.current_turn == WHITE { "w" } else { "b" },
            castling,
            en_passant,
            self.half_move_clock,
            self.full_move_number
        )
    }

    /// Squares holding a piece of `color`, ascending.
    pub fn occupied_squares(&self, color: u8) -> impl Iterator<Item = Square> {
        iterate_bits(self.bitboards.get_all_pieces(color)).map(index_to_square)
    }

    /// Number of pieces of `color` on the board, king included.
    pub fn piece_count(&self, color: u8) -> u32 {
        count_bits(self.bitboards.get_all_pieces(color))
    }

    /// Moves played by `color` so far, oldest first.
    pub fn played_moves_by(&self, color: u8) -> impl Iterator<Item = &GameMove> {
        self.move_history.iter().filter(move |game_move| game_move.mover() == color)
    }

    pub fn has_castled(&self, color: u8) -> bool {
        self.played_moves_by(color).any(|game_move| game_move.is_castling)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                write!(f, " {}", piece_to_char(self.get_piece(Square::new(file, rank))))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", color_name(self.current_turn))
    }
}
