use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Self {
        Self(rank * 8 + file)
    }

    pub fn file(&self) -> u8 {
        self.0 % 8
    }

    pub fn rank(&self) -> u8 {
        self.0 / 8
    }

    /// Offset by a file/rank delta, `None` when it falls off the board.
    pub fn offset(&self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Parse a square such as `e4`.
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Self::new(file, rank))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

// 4-bit piece representation
// Bits 0-2: piece type (0=empty, 1=pawn, 2=knight, 3=bishop, 4=rook, 5=queen, 6=king)
// Bit 3: color (0=black, 1=white)
pub type Piece = u8;

pub const EMPTY: u8 = 0;

// Piece types (bits 0-2)
pub const PAWN: u8 = 1;
pub const KNIGHT: u8 = 2;
pub const BISHOP: u8 = 3;
pub const ROOK: u8 = 4;
pub const QUEEN: u8 = 5;
pub const KING: u8 = 6;

// Colors (bit 3)
pub const BLACK: u8 = 0;
pub const WHITE: u8 = 8;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn make_piece(piece_type: u8, color: u8) -> Piece {
    piece_type | color
}

pub fn piece_type(piece: Piece) -> u8 {
    piece & 7
}

pub fn piece_color(piece: Piece) -> u8 {
    piece & 8
}

pub fn is_white(piece: Piece) -> bool {
    !is_empty(piece) && piece_color(piece) == WHITE
}

pub fn is_empty(piece: Piece) -> bool {
    piece == EMPTY
}

pub fn opposite_color(color: u8) -> u8 {
    color ^ WHITE
}

pub fn is_piece_color(piece: Piece, color: u8) -> bool {
    !is_empty(piece) && piece_color(piece) == color
}

pub fn color_name(color: u8) -> &'static str {
    if color == WHITE {
        "White"
    } else {
        "Black"
    }
}

// Relative piece values indexed by piece type; the king is never counted
pub const PIECE_VALUES: [f64; 7] = [
    0.0,  // Empty
    1.0,  // Pawn
    3.0,  // Knight
    3.0,  // Bishop
    5.0,  // Rook
    10.0, // Queen
    0.0,  // King
];

pub fn material_value(piece: Piece) -> f64 {
    PIECE_VALUES[piece_type(piece) as usize]
}

/// FEN letter for a piece, uppercase for White.
pub fn piece_to_char(piece: Piece) -> char {
    let ch = match piece_type(piece) {
        PAWN => 'p',
        KNIGHT => 'n',
        BISHOP => 'b',
        ROOK => 'r',
        QUEEN => 'q',
        KING => 'k',
        _ => '.',
    };
    if is_white(piece) {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<u8>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    pub fn new_promotion(from: Square, to: Square, piece_type: u8) -> Self {
        Self { from, to, promotion: Some(piece_type) }
    }

    /// Parse coordinate notation (`e2e4`, `e7e8q`).
    pub fn from_uci(text: &str) -> Option<Self> {
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return None;
        }
        let from = Square::from_algebraic(&text[0..2])?;
        let to = Square::from_algebraic(&text[2..4])?;
        match text[4..].chars().next() {
            None => Some(Self::new(from, to)),
            Some(ch) => {
                let promotion = match ch.to_ascii_lowercase() {
                    'q' => QUEEN,
                    'r' => ROOK,
                    'b' => BISHOP,
                    'n' => KNIGHT,
                    _ => return None,
                };
                Some(Self::new_promotion(from, to, promotion))
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", piece_to_char(make_piece(promotion, BLACK)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Checkmate(u8), // Which color is checkmated (other color wins)
    Stalemate,
    Draw(DrawReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    InsufficientMaterial,
}

/// History entry for one executed move. Holds everything `undo_move` needs.
#[derive(Debug, Clone)]
pub struct GameMove {
    pub mv: Move,
    pub moved_piece: Piece,
    pub captured_piece: Piece,
    pub promotion: Option<u8>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub previous_castling_rights: u8,
    pub previous_en_passant_target: Option<Square>,
    pub previous_en_passant_pawn: Option<Square>,
    pub previous_half_move_clock: u16,
    pub previous_full_move_number: u16,
}

impl GameMove {
    /// Color of the side that played this move.
    pub fn mover(&self) -> u8 {
        piece_color(self.moved_piece)
    }

    pub fn is_capture(&self) -> bool {
        !is_empty(self.captured_piece)
    }
}

// Castling rights bitfield constants
pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;
pub const ALL_CASTLING_RIGHTS: u8 = 0b1111;

pub fn has_castling_right(castling_rights: u8, right: u8) -> bool {
    castling_rights & right != 0
}

pub fn remove_castling_right(castling_rights: &mut u8, right: u8) {
    *castling_rights &= !right;
}

pub fn get_castling_rights_for_color(castling_rights: u8, color: u8) -> u8 {
    if color == WHITE {
        castling_rights & (WHITE_KINGSIDE | WHITE_QUEENSIDE)
    } else {
        castling_rights & (BLACK_KINGSIDE | BLACK_QUEENSIDE)
    }
}
