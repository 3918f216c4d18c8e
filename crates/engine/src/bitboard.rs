use crate::types::*;

pub type Bitboard = u64;

pub const BITBOARD_EMPTY: Bitboard = 0;

// File masks
pub const FILE_A: Bitboard = 0x0101010101010101;

// Core bitboard operations
pub fn set_bit(bitboard: &mut Bitboard, square: u8) {
    *bitboard |= 1u64 << square;
}

pub fn clear_bit(bitboard: &mut Bitboard, square: u8) {
    *bitboard &= !(1u64 << square);
}

pub fn count_bits(bitboard: Bitboard) -> u32 {
    bitboard.count_ones()
}

pub fn index_to_square(index: u8) -> Square {
    Square(index)
}

// Pop LSB (remove and return the least significant bit)
pub fn pop_lsb(bitboard: &mut Bitboard) -> Option<u8> {
    if *bitboard == 0 {
        None
    } else {
        let lsb = bitboard.trailing_zeros() as u8;
        *bitboard &= *bitboard - 1;
        Some(lsb)
    }
}

/// Iterates set bits from a1 upwards, which fixes move enumeration order.
pub struct BitboardIterator {
    bitboard: Bitboard,
}

impl BitboardIterator {
    pub fn new(bitboard: Bitboard) -> Self {
        BitboardIterator { bitboard }
    }
}

impl Iterator for BitboardIterator {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        pop_lsb(&mut self.bitboard)
    }
}

pub fn iterate_bits(bitboard: Bitboard) -> BitboardIterator {
    BitboardIterator::new(bitboard)
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
const KING_OFFSETS: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

const fn build_attack_table(offsets: [(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut square = 0;
    while square < 64 {
        let file = (square % 8) as i8;
        let rank = (square / 8) as i8;
        let mut attacks = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let new_file = file + offsets[i].0;
            let new_rank = rank + offsets[i].1;
            if new_file >= 0 && new_file < 8 && new_rank >= 0 && new_rank < 8 {
                attacks |= 1u64 << (new_rank * 8 + new_file) as u32;
            }
            i += 1;
        }
        table[square] = attacks;
        square += 1;
    }
    table
}

static KNIGHT_ATTACKS: [Bitboard; 64] = build_attack_table(KNIGHT_OFFSETS);
static KING_ATTACKS: [Bitboard; 64] = build_attack_table(KING_OFFSETS);

pub fn get_knight_attacks(square: u8) -> Bitboard {
    KNIGHT_ATTACKS[square as usize]
}

pub fn get_king_attacks(square: u8) -> Bitboard {
    KING_ATTACKS[square as usize]
}

/// Per-color, per-piece-type occupancy kept in step with `Board::squares`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitboardManager {
    pieces: [[Bitboard; 7]; 2],
}

fn color_index(color: u8) -> usize {
    if color == WHITE {
        0
    } else {
        1
    }
}

impl BitboardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `square` changed from `old` to `new`.
    pub fn update_square(&mut self, square: Square, old: Piece, new: Piece) {
        if !is_empty(old) {
            clear_bit(&mut self.pieces[color_index(piece_color(old))][piece_type(old) as usize], square.0);
        }
        if !is_empty(new) {
            set_bit(&mut self.pieces[color_index(piece_color(new))][piece_type(new) as usize], square.0);
        }
    }

    pub fn get_pieces(&self, color: u8, piece_type: u8) -> Bitboard {
        self.pieces[color_index(color)][piece_type as usize]
    }

    pub fn get_all_pieces(&self, color: u8) -> Bitboard {
        self.pieces[color_index(color)][PAWN as usize..=KING as usize]
            .iter()
            .fold(BITBOARD_EMPTY, |acc, bb| acc | bb)
    }

    pub fn count_pieces(&self, color: u8, piece_type: u8) -> u32 {
        count_bits(self.get_pieces(color, piece_type))
    }

    pub fn find_pieces(&self, color: u8, piece_type: u8) -> Vec<Square> {
        iterate_bits(self.get_pieces(color, piece_type)).map(index_to_square).collect()
    }

}
