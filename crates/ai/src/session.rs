use crate::error::{SearchError, SearchResult};
use crate::evaluation::{EvalWeights, Evaluator, HeuristicEvaluator};
use crate::rules::RulesEngine;
use crate::search::SearchEngine;
use crate::types::*;
use engine::{Board, BoardResult, GameMove, GameStatus, Move};
use rand::seq::SliceRandom;
use rand::Rng;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Throughput of the execute/undo path measured by [`EngineSession::benchmark`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkReport {
    pub plies: u64,
    pub elapsed: Duration,
}

impl BenchmarkReport {
    pub fn plies_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.plies as f64 / secs
    }
}

/// One game in progress plus the search that analyzes it.
#[derive(Debug, Clone)]
pub struct EngineSession<E = HeuristicEvaluator> {
    board: Board,
    search: SearchEngine<E>,
}

impl EngineSession<HeuristicEvaluator> {
    pub fn new() -> Self {
        Self::with_evaluator(Board::new(), HeuristicEvaluator::default())
    }

    pub fn from_fen(fen: &str) -> BoardResult<Self> {
        Ok(Self::with_evaluator(Board::from_fen(fen)?, HeuristicEvaluator::default()))
    }

    pub fn with_weights(board: Board, weights: EvalWeights) -> Self {
        Self::with_evaluator(board, HeuristicEvaluator::new(weights))
    }
}

impl Default for EngineSession<HeuristicEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator<Board>> EngineSession<E> {
    pub fn with_evaluator(board: Board, evaluator: E) -> Self {
        Self { board, search: SearchEngine::new(evaluator) }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn evaluator(&self) -> &E {
        self.search.evaluator()
    }

    /// Analyze the current position. The caller decides whether to play the move.
    pub fn best_move(&mut self, depth: u32) -> SearchResult<PositionAnalysis<Move>> {
        if depth > MAX_DEPTH {
            return Err(SearchError::DepthTooLarge { requested: depth, max: MAX_DEPTH });
        }
        self.search.analyze(&mut self.board, depth)
    }

    pub fn apply(&mut self, mv: Move) -> BoardResult<GameMove> {
        let game_move = self.board.try_make_move(mv)?;
        debug!(%mv, fen = %self.board.to_fen(), "move applied");
        Ok(game_move)
    }

    pub fn undo(&mut self) -> BoardResult<GameMove> {
        let game_move = self.board.undo_move()?;
        debug!(mv = %game_move.mv, "move undone");
        Ok(game_move)
    }

    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    pub fn evaluate(&self) -> Valuation {
        self.search.evaluator().evaluate(&self.board)
    }

    /// Play `iterations` uniformly random legal moves, then rewind.
    ///
    /// A finished game restarts from the position the call began with. The
    /// board is left exactly as it was found.
    pub fn benchmark<G: Rng + ?Sized>(&mut self, iterations: u64, rng: &mut G) -> BoardResult<BenchmarkReport> {
        let start_len = self.board.move_history.len();
        let start_time = Instant::now();
        let mut plies = 0;

        while plies < iterations {
            let moves = self.board.get_all_legal_moves();
            let finished = self.board.game_status() != GameStatus::InProgress;
            let Some(&mv) = moves.choose(rng).filter(|_| !finished) else {
                if self.board.move_history.len() == start_len {
                    // Nothing to play from the starting position itself
                    break;
                }
                self.rewind_to(start_len)?;
                continue;
            };
            self.board.try_make_move(mv)?;
            plies += 1;
        }

        let elapsed = start_time.elapsed();
        self.rewind_to(start_len)?;

        let report = BenchmarkReport { plies, elapsed };
        info!(plies, elapsed_ms = elapsed.as_millis() as u64, plies_per_second = report.plies_per_second(), "benchmark finished");
        Ok(report)
    }

    fn rewind_to(&mut self, history_len: usize) -> BoardResult<()> {
        while self.board.move_history.len() > history_len {
            self.board.undo_move()?;
        }
        Ok(())
    }
}

impl<E> EngineSession<E>
where
    E: Evaluator<Board> + Send + 'static,
{
    /// Run one search on a dedicated worker thread.
    ///
    /// The session moves onto the worker for the duration of the search and
    /// comes back with the result, so the game state is never shared.
    pub fn spawn_best_move(
        mut self,
        depth: u32,
    ) -> io::Result<JoinHandle<(Self, SearchResult<PositionAnalysis<Move>>)>> {
        thread::Builder::new().name("search-worker".to_string()).spawn(move || {
            let result = self.best_move(depth);
            (self, result)
        })
    }
}
