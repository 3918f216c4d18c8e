use crate::error::{SearchError, SearchResult};
use crate::evaluation::Evaluator;
use crate::rules::RulesEngine;
use crate::types::*;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Depth-bounded minimax with alpha-beta pruning.
///
/// White maximizes and Black minimizes on one absolute scale. The rules
/// engine is advanced and rewound in place; every `execute` is matched by
/// exactly one `undo` before control returns to the parent node.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine<E> {
    evaluator: E,
}

impl<E> SearchEngine<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Best move for the side to move, searching `depth` plies.
    pub fn analyze<R>(&self, rules: &mut R, depth: u32) -> SearchResult<PositionAnalysis<R::Move>>
    where
        R: RulesEngine,
        E: Evaluator<R>,
    {
        let start_time = Instant::now();
        debug!(depth, side = %rules.side_to_move(), "search started");

        let analysis = self.alphabeta(rules, depth, f64::NEG_INFINITY, f64::INFINITY)?;

        let elapsed = start_time.elapsed();
        let nodes_per_second = analysis.nodes_visited as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!(
            depth,
            nodes = analysis.nodes_visited,
            valuation = analysis.valuation,
            best_move = ?analysis.best_move.map(|mv| mv.to_string()),
            elapsed_ms = elapsed.as_millis() as u64,
            nodes_per_second = nodes_per_second as u64,
            "search completed"
        );

        Ok(analysis)
    }

    /// Plain minimax over the same tree with no pruning.
    pub fn analyze_exhaustive<R>(&self, rules: &mut R, depth: u32) -> SearchResult<PositionAnalysis<R::Move>>
    where
        R: RulesEngine,
        E: Evaluator<R>,
    {
        if depth == 0 {
            return Ok(PositionAnalysis::leaf(self.evaluator.evaluate(rules)));
        }

        let moves = rules.legal_moves();
        if moves.is_empty() {
            return Ok(PositionAnalysis::leaf(self.terminal_valuation(rules)));
        }

        let maximizing = rules.side_to_move().is_white();
        let mut best = if maximizing { BLACK_WINS } else { WHITE_WINS };
        let mut best_move = None;
        let mut nodes = 0;

        for &mv in &moves {
            let child = explore(rules, mv, |rules| self.analyze_exhaustive(rules, depth - 1))?;
            nodes += child.nodes_visited;

            let improves = if maximizing { child.valuation > best } else { child.valuation < best };
            if improves {
                best = child.valuation;
                best_move = Some(mv);
            }
        }

        Ok(PositionAnalysis { best_move: best_move.or(moves.first().copied()), valuation: best, nodes_visited: nodes })
    }

    fn alphabeta<R>(
        &self,
        rules: &mut R,
        depth: u32,
        mut alpha: Valuation,
        mut beta: Valuation,
    ) -> SearchResult<PositionAnalysis<R::Move>>
    where
        R: RulesEngine,
        E: Evaluator<R>,
    {
        if depth == 0 {
            return Ok(PositionAnalysis::leaf(self.evaluator.evaluate(rules)));
        }

        let moves = rules.legal_moves();
        if moves.is_empty() {
            return Ok(PositionAnalysis::leaf(self.terminal_valuation(rules)));
        }

        let maximizing = rules.side_to_move().is_white();
        let mut best = if maximizing { BLACK_WINS } else { WHITE_WINS };
        let mut best_move = None;
        let mut nodes = 0;

        for &mv in &moves {
            let child = explore(rules, mv, |rules| self.alphabeta(rules, depth - 1, alpha, beta))?;
            nodes += child.nodes_visited;

            if maximizing {
                if child.valuation > alpha {
                    alpha = child.valuation;
                    best = child.valuation;
                    best_move = Some(mv);
                }
                if alpha >= beta {
                    trace!(depth, alpha, beta, %mv, "beta cutoff");
                    break;
                }
            } else {
                if child.valuation < beta {
                    beta = child.valuation;
                    best = child.valuation;
                    best_move = Some(mv);
                }
                if beta <= alpha {
                    trace!(depth, alpha, beta, %mv, "alpha cutoff");
                    break;
                }
            }
        }

        // Every reply loses for the mover: still name a legal move
        if best_move.is_none() {
            best_move = moves.first().copied();
        }

        Ok(PositionAnalysis { best_move, valuation: best, nodes_visited: nodes })
    }

    /// Score of a node with no legal moves.
    fn terminal_valuation<R>(&self, rules: &R) -> Valuation
    where
        R: RulesEngine,
        E: Evaluator<R>,
    {
        match rules.outcome() {
            Outcome::Win(Side::White) => WHITE_WINS,
            Outcome::Win(Side::Black) => BLACK_WINS,
            Outcome::Draw => DRAW_VALUATION,
            Outcome::InProgress => {
                debug!("no legal moves but the game is still in progress; scoring as a leaf");
                self.evaluator.evaluate(rules)
            }
        }
    }
}

/// Execute `mv`, run `search` on the child, then undo. The undo happens
/// even when the child search fails.
fn explore<R, F>(rules: &mut R, mv: R::Move, search: F) -> SearchResult<PositionAnalysis<R::Move>>
where
    R: RulesEngine,
    F: FnOnce(&mut R) -> SearchResult<PositionAnalysis<R::Move>>,
{
    rules
        .execute(mv)
        .map_err(|source| SearchError::IllegalMove { mv: mv.to_string(), source: Box::new(source) })?;

    let child = search(rules);
    let undone = rules
        .undo()
        .map_err(|source| SearchError::UnbalancedUndo { mv: mv.to_string(), source: Box::new(source) });

    let child = child?;
    undone?;
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use thiserror::Error;

    #[derive(Error, Debug, PartialEq)]
    pub enum TreeError {
        #[error("move to node {0} rejected")]
        Rejected(usize),
        #[error("cannot undo")]
        CannotUndo,
    }

    #[derive(Debug, Clone)]
    pub struct TreeNode {
        pub children: Vec<usize>,
        pub value: Valuation,
        pub outcome: Outcome,
    }

    /// Explicit game tree; a move is the id of the child node it leads to.
    #[derive(Debug, Clone)]
    pub struct TreeGame {
        pub nodes: Vec<TreeNode>,
        pub path: Vec<usize>,
        pub root_side: Side,
        pub executes: usize,
        pub undos: usize,
        pub reject_move_to: Option<usize>,
        pub fail_undo_from: Option<usize>,
    }

    impl TreeGame {
        pub fn new(root_side: Side) -> Self {
            Self {
                nodes: vec![TreeNode { children: Vec::new(), value: 0.0, outcome: Outcome::InProgress }],
                path: vec![0],
                root_side,
                executes: 0,
                undos: 0,
                reject_move_to: None,
                fail_undo_from: None,
            }
        }

        pub fn add_child(&mut self, parent: usize, value: Valuation, outcome: Outcome) -> usize {
            let id = self.nodes.len();
            self.nodes.push(TreeNode { children: Vec::new(), value, outcome });
            self.nodes[parent].children.push(id);
            id
        }

        pub fn current(&self) -> usize {
            self.path[self.path.len() - 1]
        }

        pub fn value(&self) -> Valuation {
            self.nodes[self.current()].value
        }

        /// Random tree with small integer leaf values so ties are common.
        pub fn random(rng: &mut StdRng, depth: u32) -> Self {
            let mut game = Self::new(if rng.gen_bool(0.5) { Side::White } else { Side::Black });
            game.nodes[0].value = rng.gen_range(-4..=4) as Valuation;
            game.grow(rng, 0, depth);
            game
        }

        fn grow(&mut self, rng: &mut StdRng, parent: usize, depth: u32) {
            if depth == 0 {
                return;
            }
            for _ in 0..rng.gen_range(0..=4) {
                let outcome = match rng.gen_range(0..10) {
                    0 => Outcome::Win(Side::White),
                    1 => Outcome::Win(Side::Black),
                    2 => Outcome::Draw,
                    _ => Outcome::InProgress,
                };
                let child = self.add_child(parent, rng.gen_range(-4..=4) as Valuation, outcome);
                self.grow(rng, child, depth - 1);
            }
        }
    }

    impl RulesEngine for TreeGame {
        type Move = usize;
        type Error = TreeError;

        fn legal_moves(&self) -> Vec<usize> {
            self.nodes[self.current()].children.clone()
        }

        fn execute(&mut self, mv: usize) -> Result<(), TreeError> {
            if self.reject_move_to == Some(mv) || !self.legal_moves().contains(&mv) {
                return Err(TreeError::Rejected(mv));
            }
            self.executes += 1;
            self.path.push(mv);
            Ok(())
        }

        fn undo(&mut self) -> Result<(), TreeError> {
            if self.path.len() == 1 || self.fail_undo_from == Some(self.current()) {
                return Err(TreeError::CannotUndo);
            }
            self.undos += 1;
            self.path.pop();
            Ok(())
        }

        fn outcome(&self) -> Outcome {
            self.nodes[self.current()].outcome
        }

        fn side_to_move(&self) -> Side {
            if (self.path.len() - 1) % 2 == 0 {
                self.root_side
            } else {
                self.root_side.opponent()
            }
        }
    }

    pub fn tree_search() -> SearchEngine<fn(&TreeGame) -> Valuation> {
        SearchEngine::new(TreeGame::value as fn(&TreeGame) -> Valuation)
    }

    /// White root with two moves, each answered by three Black replies.
    fn two_by_three(first: [Valuation; 3], second: [Valuation; 3]) -> TreeGame {
        let mut game = TreeGame::new(Side::White);
        for values in [first, second] {
            let reply = game.add_child(0, 0.0, Outcome::InProgress);
            for value in values {
                game.add_child(reply, value, Outcome::InProgress);
            }
        }
        game
    }

    #[test]
    fn depth_zero_is_the_evaluation() {
        let mut game = two_by_three([1.0, 2.0, 3.0], [5.0, 4.0, 3.0]);
        game.nodes[0].value = 0.75;
        let analysis = tree_search().analyze(&mut game, 0).unwrap();
        assert_eq!(analysis, PositionAnalysis { best_move: None, valuation: 0.75, nodes_visited: 1 });
        assert_eq!(game.executes, 0);
    }

    #[test]
    fn counts_every_leaf_when_nothing_prunes() {
        let mut game = two_by_three([1.0, 2.0, 3.0], [5.0, 4.0, 3.0]);
        let analysis = tree_search().analyze(&mut game, 2).unwrap();
        assert_eq!(analysis.nodes_visited, 6);
        assert_eq!(analysis.valuation, 3.0);
        assert_eq!(analysis.best_move, Some(game.nodes[0].children[1]));
        assert_eq!(game.executes, game.undos);
        assert_eq!(game.path, vec![0]);
    }

    #[test]
    fn refuted_move_is_cut_off() {
        // The first Black reply to the second move already scores below 1
        let mut game = two_by_three([1.0, 2.0, 3.0], [0.0, 4.0, 5.0]);
        let analysis = tree_search().analyze(&mut game, 2).unwrap();
        assert_eq!(analysis.nodes_visited, 4);
        assert_eq!(analysis.valuation, 1.0);
        assert_eq!(analysis.best_move, Some(game.nodes[0].children[0]));
        assert_eq!(game.executes, game.undos);

        let exhaustive = tree_search().analyze_exhaustive(&mut game, 2).unwrap();
        assert_eq!(exhaustive.nodes_visited, 6);
        assert_eq!(exhaustive.valuation, analysis.valuation);
    }

    #[test]
    fn equal_moves_keep_the_first() {
        let mut game = TreeGame::new(Side::Black);
        let first = game.add_child(0, -1.0, Outcome::InProgress);
        game.add_child(0, -1.0, Outcome::InProgress);
        let analysis = tree_search().analyze(&mut game, 1).unwrap();
        assert_eq!(analysis.best_move, Some(first));
        assert_eq!(analysis.valuation, -1.0);
    }

    #[test]
    fn terminal_nodes_use_sentinels() {
        for (outcome, expected) in [
            (Outcome::Win(Side::White), WHITE_WINS),
            (Outcome::Win(Side::Black), BLACK_WINS),
            (Outcome::Draw, DRAW_VALUATION),
        ] {
            let mut game = TreeGame::new(Side::White);
            game.nodes[0].outcome = outcome;
            game.nodes[0].value = 3.0;
            let analysis = tree_search().analyze(&mut game, 3).unwrap();
            assert_eq!(analysis, PositionAnalysis { best_move: None, valuation: expected, nodes_visited: 1 });
        }
    }

    #[test]
    fn contradictory_in_progress_leaf_is_evaluated() {
        let mut game = TreeGame::new(Side::White);
        game.nodes[0].value = -2.5;
        let analysis = tree_search().analyze(&mut game, 2).unwrap();
        assert_eq!(analysis.valuation, -2.5);
        assert_eq!(analysis.best_move, None);
    }

    #[test]
    fn forced_loss_still_names_a_move() {
        let mut game = TreeGame::new(Side::White);
        let first = game.add_child(0, 0.0, Outcome::Win(Side::Black));
        game.add_child(0, 0.0, Outcome::Win(Side::Black));
        let analysis = tree_search().analyze(&mut game, 2).unwrap();
        assert_eq!(analysis.valuation, BLACK_WINS);
        assert_eq!(analysis.best_move, Some(first));
        assert_eq!(analysis.nodes_visited, 2);
    }

    #[test]
    fn pruning_never_changes_the_valuation() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..300 {
            let mut game = TreeGame::random(&mut rng, 4);
            for depth in 0..=4 {
                let pruned = tree_search().analyze(&mut game, depth).unwrap();
                let full = tree_search().analyze_exhaustive(&mut game, depth).unwrap();
                assert_eq!(pruned.valuation, full.valuation, "depth {}", depth);
                assert!(pruned.nodes_visited >= 1 && pruned.nodes_visited <= full.nodes_visited);
                if let Some(mv) = pruned.best_move {
                    assert!(game.nodes[0].children.contains(&mv));
                } else {
                    assert!(depth == 0 || game.nodes[0].children.is_empty());
                }
                assert_eq!(game.path, vec![0]);
                assert_eq!(game.executes, game.undos);
            }
        }
    }

    #[test]
    fn rejected_move_aborts_and_stays_balanced() {
        let mut game = two_by_three([1.0, 2.0, 3.0], [5.0, 4.0, 3.0]);
        let second_reply = game.nodes[0].children[1];
        game.reject_move_to = Some(game.nodes[second_reply].children[2]);

        let err = tree_search().analyze(&mut game, 2).unwrap_err();
        assert!(matches!(err, SearchError::IllegalMove { ref mv, .. } if *mv == (second_reply + 3).to_string()));
        assert_eq!(game.executes, game.undos);
        assert_eq!(game.path, vec![0]);
    }

    #[test]
    fn failed_undo_aborts_the_search() {
        let mut game = two_by_three([1.0, 2.0, 3.0], [5.0, 4.0, 3.0]);
        let first_reply = game.nodes[0].children[0];
        game.fail_undo_from = Some(game.nodes[first_reply].children[1]);

        let err = tree_search().analyze(&mut game, 2).unwrap_err();
        assert!(matches!(err, SearchError::UnbalancedUndo { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
