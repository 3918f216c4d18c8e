use std::fmt;

/// Position score on an absolute scale, positive favors White.
pub type Valuation = f64;

/// Forced win for White.
pub const WHITE_WINS: Valuation = f64::INFINITY;
/// Forced win for Black.
pub const BLACK_WINS: Valuation = f64::NEG_INFINITY;
pub const DRAW_VALUATION: Valuation = 0.0;

/// Maximum search depth accepted by the session
pub const MAX_DEPTH: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn is_white(self) -> bool {
        self == Side::White
    }

    /// +1 for White, -1 for Black; turns a mover-relative score absolute.
    pub fn sign(self) -> Valuation {
        match self {
            Side::White => 1.0,
            Side::Black => -1.0,
        }
    }

    pub fn from_color(color: u8) -> Side {
        if color == engine::WHITE {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn color(self) -> u8 {
        match self {
            Side::White => engine::WHITE,
            Side::Black => engine::BLACK,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::White => "White",
            Side::Black => "Black",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
    InProgress,
}

/// Result of analyzing one subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionAnalysis<M> {
    /// `None` only at depth 0 or when the position has no legal move.
    pub best_move: Option<M>,
    pub valuation: Valuation,
    /// Leaf evaluations performed in the subtree, always at least 1.
    pub nodes_visited: u64,
}

impl<M> PositionAnalysis<M> {
    pub fn leaf(valuation: Valuation) -> Self {
        Self { best_move: None, valuation, nodes_visited: 1 }
    }
}

impl<M: fmt::Display> fmt::Display for PositionAnalysis<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.best_move {
            Some(mv) => write!(f, "{}", mv)?,
            None => f.write_str("(none)")?,
        }
        if self.valuation == WHITE_WINS {
            f.write_str(" White wins")?;
        } else if self.valuation == BLACK_WINS {
            f.write_str(" Black wins")?;
        } else {
            write!(f, " {:+.3}", self.valuation)?;
        }
        write!(f, " ({} nodes)", self.nodes_visited)
    }
}
