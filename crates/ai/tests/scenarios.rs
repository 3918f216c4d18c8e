use ai::{
    EngineSession, EvalWeights, Evaluator, HeuristicEvaluator, Outcome, RulesEngine, SearchEngine, Side,
    BLACK_WINS, DRAW_VALUATION, WHITE_WINS,
};
use engine::{Board, Move, STARTING_FEN};

const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
const BACK_RANK_WHITE: &str = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";
const BACK_RANK_BLACK: &str = "r5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1";

fn search() -> SearchEngine<HeuristicEvaluator> {
    SearchEngine::new(HeuristicEvaluator::default())
}

fn uci(text: &str) -> Move {
    Move::from_uci(text).unwrap()
}

#[test]
fn opening_depth_one_visits_every_reply() {
    let mut board = Board::new();
    let legal = board.legal_moves();
    let analysis = search().analyze(&mut board, 1).unwrap();

    assert_eq!(analysis.nodes_visited, 20);
    assert!(legal.contains(&analysis.best_move.unwrap()));
    assert_eq!(board.to_fen(), STARTING_FEN);
}

#[test]
fn depth_zero_returns_the_evaluation() {
    let mut board = Board::from_fen(BACK_RANK_WHITE).unwrap();
    let expected = HeuristicEvaluator::default().evaluate(&board);
    let analysis = search().analyze(&mut board, 0).unwrap();

    assert_eq!(analysis.best_move, None);
    assert_eq!(analysis.valuation, expected);
    assert_eq!(analysis.nodes_visited, 1);
}

#[test]
fn checkmated_root_scores_the_winner() {
    let mut board = Board::from_fen(FOOLS_MATE).unwrap();
    assert_eq!(board.outcome(), Outcome::Win(Side::Black));

    let analysis = search().analyze(&mut board, 3).unwrap();
    assert_eq!(analysis.best_move, None);
    assert_eq!(analysis.valuation, BLACK_WINS);
    assert_eq!(analysis.nodes_visited, 1);
}

#[test]
fn stalemated_root_is_a_draw() {
    let mut board = Board::from_fen(STALEMATE).unwrap();
    let analysis = search().analyze(&mut board, 2).unwrap();
    assert_eq!(analysis.best_move, None);
    assert_eq!(analysis.valuation, DRAW_VALUATION);
    assert_eq!(analysis.nodes_visited, 1);
}

#[test]
fn finds_back_rank_mate_for_white() {
    let mut board = Board::from_fen(BACK_RANK_WHITE).unwrap();
    let analysis = search().analyze(&mut board, 2).unwrap();
    assert_eq!(analysis.best_move, Some(uci("a1a8")));
    assert_eq!(analysis.valuation, WHITE_WINS);
    assert_eq!(board.to_fen(), BACK_RANK_WHITE);
}

#[test]
fn finds_back_rank_mate_for_black() {
    let mut board = Board::from_fen(BACK_RANK_BLACK).unwrap();
    let analysis = search().analyze(&mut board, 2).unwrap();
    assert_eq!(analysis.best_move, Some(uci("a8a1")));
    assert_eq!(analysis.valuation, BLACK_WINS);
}

#[test]
fn searches_positions_with_maxed_out_clocks() {
    for fen in ["4k3/8/8/8/8/8/8/R3K3 b - - 0 65535", "4k3/8/8/8/8/8/8/R3K3 w - - 65535 1"] {
        let mut board = Board::from_fen(fen).unwrap();
        let analysis = search().analyze(&mut board, 1).unwrap();
        assert!(analysis.best_move.is_some());
        assert_eq!(board.to_fen(), fen);
    }
}

#[test]
fn pruning_matches_full_minimax_on_real_positions() {
    let cases = [
        (STARTING_FEN, 2),
        ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 2),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 3),
        (BACK_RANK_BLACK, 3),
    ];

    for weights in [EvalWeights::default(), EvalWeights::material_only()] {
        let search = SearchEngine::new(HeuristicEvaluator::new(weights));
        for (fen, depth) in cases {
            let mut board = Board::from_fen(fen).unwrap();
            let pruned = search.analyze(&mut board, depth).unwrap();
            let full = search.analyze_exhaustive(&mut board, depth).unwrap();

            assert_eq!(pruned.valuation, full.valuation, "{} at depth {}", fen, depth);
            assert!(pruned.nodes_visited <= full.nodes_visited);
            assert_eq!(board.to_fen(), fen, "search must rewind every move");
        }
    }
}

#[test]
fn session_plays_a_short_self_play_game() {
    let mut session = EngineSession::new();
    for _ in 0..4 {
        let analysis = session.best_move(1).unwrap();
        let mv = analysis.best_move.unwrap();
        session.apply(mv).unwrap();
    }

    assert_eq!(session.board().move_history.len(), 4);
    assert_eq!(session.outcome(), Outcome::InProgress);
    for _ in 0..4 {
        session.undo().unwrap();
    }
    assert_eq!(session.board().to_fen(), STARTING_FEN);
}

#[test]
fn session_evaluate_matches_evaluator() {
    let session = EngineSession::from_fen(BACK_RANK_WHITE).unwrap();
    let board = Board::from_fen(BACK_RANK_WHITE).unwrap();
    assert_eq!(session.evaluate(), HeuristicEvaluator::default().evaluate(&board));
}
