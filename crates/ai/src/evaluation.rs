use crate::types::{Side, Valuation};
use engine::bitboard::{count_bits, FILE_A};
use engine::{material_value, piece_type, Board, Square, BISHOP, KNIGHT, PAWN};

/// Side to move delivered check (the side not to move is in check)
pub const CHECK_BONUS: Valuation = 1.0;
/// Side to move is in check
pub const IN_CHECK_PENALTY: Valuation = -0.3;
/// Per piece more than the opponent
pub const PIECE_COUNT_WEIGHT: Valuation = 0.1;
/// Per attacker the mover has on an occupied opposing square
pub const ATTACK_PRESSURE_WEIGHT: Valuation = 0.001;
/// Per attacker the opponent has on an occupied square of the mover
pub const EXPOSURE_WEIGHT: Valuation = 0.0005;
pub const CASTLED_BONUS: Valuation = 2.0;
/// Applied when a side holds no castling right on either flank
pub const CASTLING_LOST_PENALTY: Valuation = -2.0;
/// Per knight or bishop off its home square
pub const DEVELOPMENT_WEIGHT: Valuation = 0.05;
/// Per extra pawn on a file
pub const DOUBLED_PAWN_PENALTY: Valuation = 0.1;

/// Maps a game state to a White-positive score.
pub trait Evaluator<R: ?Sized> {
    fn evaluate(&self, state: &R) -> Valuation;
}

impl<R: ?Sized, F> Evaluator<R> for F
where
    F: Fn(&R) -> Valuation,
{
    fn evaluate(&self, state: &R) -> Valuation {
        self(state)
    }
}

/// Weights of the non-material terms. Material is always counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub check_bonus: Valuation,
    pub in_check_penalty: Valuation,
    pub piece_count: Valuation,
    pub attack_pressure: Valuation,
    pub exposure: Valuation,
    pub castled_bonus: Valuation,
    pub castling_lost_penalty: Valuation,
    pub development: Valuation,
    pub doubled_pawn_penalty: Valuation,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            check_bonus: CHECK_BONUS,
            in_check_penalty: IN_CHECK_PENALTY,
            piece_count: PIECE_COUNT_WEIGHT,
            attack_pressure: ATTACK_PRESSURE_WEIGHT,
            exposure: EXPOSURE_WEIGHT,
            castled_bonus: CASTLED_BONUS,
            castling_lost_penalty: CASTLING_LOST_PENALTY,
            development: DEVELOPMENT_WEIGHT,
            doubled_pawn_penalty: DOUBLED_PAWN_PENALTY,
        }
    }
}

impl EvalWeights {
    /// Check, piece count, pressure and castling, without development terms.
    pub fn classic() -> Self {
        Self { development: 0.0, doubled_pawn_penalty: 0.0, ..Self::default() }
    }

    pub fn material_only() -> Self {
        Self {
            check_bonus: 0.0,
            in_check_penalty: 0.0,
            piece_count: 0.0,
            attack_pressure: 0.0,
            exposure: 0.0,
            castled_bonus: 0.0,
            castling_lost_penalty: 0.0,
            development: 0.0,
            doubled_pawn_penalty: 0.0,
        }
    }
}

/// Every term of one evaluation on the White-positive scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvaluationBreakdown {
    pub material: Valuation,
    pub check: Valuation,
    pub piece_count: Valuation,
    pub pressure: Valuation,
    pub development: Valuation,
    pub castling: Valuation,
    pub total: Valuation,
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    weights: EvalWeights,
}

impl HeuristicEvaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    pub fn evaluate_detailed(&self, board: &Board) -> EvaluationBreakdown {
        let weights = &self.weights;
        let us = Side::from_color(board.current_turn);
        let them = us.opponent();
        // The extra terms are scored for the mover, then oriented
        let sign = us.sign();

        let material = material_balance(board, Side::White) - material_balance(board, Side::Black);

        let check = if board.is_in_check(them.color()) {
            weights.check_bonus
        } else if board.is_in_check(us.color()) {
            weights.in_check_penalty
        } else {
            0.0
        };

        let piece_count =
            (board.piece_count(us.color()) as Valuation - board.piece_count(them.color()) as Valuation) * weights.piece_count;

        let pressure = weights.attack_pressure * total_attackers(board, us) as Valuation
            - weights.exposure * total_attackers(board, them) as Valuation;

        let development = weights.development
            * (developed_minors(board, us) as Valuation - developed_minors(board, them) as Valuation)
            - weights.doubled_pawn_penalty * (doubled_pawns(board, us) as Valuation - doubled_pawns(board, them) as Valuation);

        let mut castling = 0.0;
        if board.has_castled(us.color()) {
            castling += weights.castled_bonus;
        }
        if board.has_castled(them.color()) {
            castling -= weights.castled_bonus;
        }
        if !can_still_castle(board, us) {
            castling += weights.castling_lost_penalty;
        }
        if !can_still_castle(board, them) {
            castling -= weights.castling_lost_penalty;
        }

        let mut breakdown = EvaluationBreakdown {
            material,
            check: check * sign,
            piece_count: piece_count * sign,
            pressure: pressure * sign,
            development: development * sign,
            castling: castling * sign,
            total: 0.0,
        };
        breakdown.total = breakdown.material
            + breakdown.check
            + breakdown.piece_count
            + breakdown.pressure
            + breakdown.development
            + breakdown.castling;
        breakdown
    }
}

impl Evaluator<Board> for HeuristicEvaluator {
    fn evaluate(&self, board: &Board) -> Valuation {
        self.evaluate_detailed(board).total
    }
}

fn material_balance(board: &Board, side: Side) -> Valuation {
    board.occupied_squares(side.color()).map(|square| material_value(board.get_piece(square))).sum()
}

/// Attackers `side` has on squares occupied by the opponent. Empty squares do not count.
fn total_attackers(board: &Board, side: Side) -> u32 {
    board
        .occupied_squares(side.opponent().color())
        .map(|square| board.attackers_of(square, side.color()))
        .sum()
}

fn developed_minors(board: &Board, side: Side) -> u32 {
    let home_rank = if side.is_white() { 0 } else { 7 };
    let is_home = |square: Square, kind: u8| {
        let home_files: [u8; 2] = if kind == KNIGHT { [1, 6] } else { [2, 5] };
        square.rank() == home_rank && home_files.contains(&square.file())
    };

    board
        .occupied_squares(side.color())
        .filter(|&square| {
            let kind = piece_type(board.get_piece(square));
            (kind == KNIGHT || kind == BISHOP) && !is_home(square, kind)
        })
        .count() as u32
}

fn doubled_pawns(board: &Board, side: Side) -> u32 {
    let pawns = board.bitboards().get_pieces(side.color(), PAWN);
    (0..8).map(|file| count_bits(pawns & (FILE_A << file)).saturating_sub(1)).sum()
}

fn can_still_castle(board: &Board, side: Side) -> bool {
    engine::get_castling_rights_for_color(board.castling_rights, side.color()) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(fen: &str) -> Valuation {
        HeuristicEvaluator::default().evaluate(&Board::from_fen(fen).unwrap())
    }

    #[test]
    fn starting_position_is_balanced() {
        let breakdown = HeuristicEvaluator::default().evaluate_detailed(&Board::new());
        assert_eq!(breakdown, EvaluationBreakdown::default());
    }

    #[test]
    fn extra_pawn_scores_higher() {
        let with_pawn = evaluate("4k3/8/8/8/8/8/P7/4K3 w - - 0 1");
        let without = evaluate("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(with_pawn > without);

        // Same comparison with Black to move
        let with_pawn = evaluate("4k3/8/8/8/8/8/P7/4K3 b - - 0 1");
        let without = evaluate("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert!(with_pawn > without);
    }

    #[test]
    fn delivering_check_scores_higher() {
        let checking = evaluate("4k3/8/8/8/8/8/4R3/4K3 b - - 0 1");
        let quiet = evaluate("4k3/8/8/8/8/8/3R4/4K3 b - - 0 1");
        assert!(checking > quiet);
    }

    #[test]
    fn score_is_oriented_to_white() {
        // Black is a rook up, whoever is to move
        assert!(evaluate("r3k3/8/8/8/8/8/8/4K3 w - - 0 1") < 0.0);
        assert!(evaluate("r3k3/8/8/8/8/8/8/4K3 b - - 0 1") < 0.0);
    }

    #[test]
    fn material_only_ignores_positional_terms() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4R3/4K3 b - - 0 1").unwrap();
        let evaluator = HeuristicEvaluator::new(EvalWeights::material_only());
        assert_eq!(evaluator.evaluate(&board), 5.0);
    }

    #[test]
    fn lost_castling_rights_are_penalized() {
        let breakdown = HeuristicEvaluator::default()
            .evaluate_detailed(&Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1").unwrap());
        assert_eq!(breakdown.castling, CASTLING_LOST_PENALTY);
    }

    #[test]
    fn castling_history_earns_the_bonus() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.try_make_move(engine::Move::from_uci("e1g1").unwrap()).unwrap();
        // Black to move: White castled (+2) and has no rights left (-2)
        let breakdown = HeuristicEvaluator::default().evaluate_detailed(&board);
        assert_eq!(breakdown.castling, 0.0);
    }

    #[test]
    fn development_and_doubled_pawns() {
        let board = Board::from_fen("4k3/8/8/8/8/2NP4/3P4/4K3 w - - 0 1").unwrap();
        let breakdown = HeuristicEvaluator::default().evaluate_detailed(&board);
        assert!((breakdown.development - (DEVELOPMENT_WEIGHT - DOUBLED_PAWN_PENALTY)).abs() < 1e-12);

        let classic = HeuristicEvaluator::new(EvalWeights::classic()).evaluate_detailed(&board);
        assert_eq!(classic.development, 0.0);
    }

    #[test]
    fn doubled_pawns_on_edge_files() {
        let board = Board::from_fen("4k3/8/8/7P/P6P/P6P/8/4K3 w - - 0 1").unwrap();
        assert_eq!(doubled_pawns(&board, Side::White), 3);
        assert_eq!(doubled_pawns(&board, Side::Black), 0);
        assert_eq!(doubled_pawns(&Board::new(), Side::Black), 0);
    }

    #[test]
    fn closures_are_evaluators() {
        let constant = |_: &Board| 1.5;
        assert_eq!(constant.evaluate(&Board::new()), 1.5);
    }
}
