use ai::{EngineSession, EvalWeights, Outcome, RulesEngine, MAX_DEPTH};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{perft_detailed, perft_divide, Board, GameLog, Move, STARTING_FEN};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chess-cli", version, about = "Alpha-beta chess analysis")]
struct Cli {
    /// Directory for self-play game transcripts
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the position and print the best move
    BestMove {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, default_value_t = 4)]
        depth: u32,
    },
    /// Print the static evaluation and its terms
    Eval {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Count move-tree leaves
    Perft {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, default_value_t = 3)]
        depth: u32,
        /// Show the node count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Play random moves and report execute/undo throughput
    Benchmark {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, default_value_t = 100_000)]
        iterations: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Let the engine play both sides
    SelfPlay {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, default_value_t = 3)]
        depth: u32,
        /// Stop after this many plies even if the game is not over
        #[arg(long, default_value_t = 200)]
        max_plies: u32,
    },
}

#[derive(Args, Debug)]
struct PositionArgs {
    /// Starting position, defaults to the standard one
    #[arg(long)]
    fen: Option<String>,
    /// Moves to play first, in coordinate notation (e2e4,e7e5)
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
    #[arg(long, value_enum, default_value_t = WeightsPreset::Full)]
    weights: WeightsPreset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WeightsPreset {
    /// Every heuristic term
    Full,
    /// No development or doubled-pawn terms
    Classic,
    Material,
}

impl From<WeightsPreset> for EvalWeights {
    fn from(preset: WeightsPreset) -> Self {
        match preset {
            WeightsPreset::Full => EvalWeights::default(),
            WeightsPreset::Classic => EvalWeights::classic(),
            WeightsPreset::Material => EvalWeights::material_only(),
        }
    }
}

impl PositionArgs {
    fn session(&self) -> Result<EngineSession> {
        let board = match &self.fen {
            Some(fen) => Board::from_fen(fen)?,
            None => Board::new(),
        };
        let mut session = EngineSession::with_weights(board, self.weights.into());
        for text in &self.moves {
            let mv = Move::from_uci(text).ok_or_else(|| anyhow!("cannot parse move '{}'", text))?;
            session.apply(mv).with_context(|| format!("while replaying --moves at {}", text))?;
        }
        Ok(session)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::BestMove { position, depth } => best_move(&position, depth),
        Command::Eval { position } => eval(&position),
        Command::Perft { position, depth, divide } => perft(&position, depth, divide),
        Command::Benchmark { position, iterations, seed } => benchmark(&position, iterations, seed),
        Command::SelfPlay { position, depth, max_plies } => self_play(&position, depth, max_plies, cli.log_dir),
    }
}

fn best_move(position: &PositionArgs, depth: u32) -> Result<()> {
    let mut session = position.session()?;
    let start_time = Instant::now();
    let analysis = session.best_move(depth)?;
    let elapsed = start_time.elapsed();

    println!("{}", session.board());
    println!();
    println!("best move: {}", analysis);
    println!(
        "depth {} in {:.3}s ({:.0} nodes/sec)",
        depth,
        elapsed.as_secs_f64(),
        analysis.nodes_visited as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn eval(position: &PositionArgs) -> Result<()> {
    let session = position.session()?;
    let breakdown = session.evaluator().evaluate_detailed(session.board());

    println!("{}", session.board());
    println!();
    println!("material     {:+.4}", breakdown.material);
    println!("check        {:+.4}", breakdown.check);
    println!("piece count  {:+.4}", breakdown.piece_count);
    println!("pressure     {:+.4}", breakdown.pressure);
    println!("development  {:+.4}", breakdown.development);
    println!("castling     {:+.4}", breakdown.castling);
    println!("total        {:+.4}", breakdown.total);
    Ok(())
}

fn perft(position: &PositionArgs, depth: u32, divide: bool) -> Result<()> {
    let mut board = position.session()?.board().clone();

    if divide {
        let results = perft_divide(&mut board, depth)?;
        for (mv, nodes) in &results {
            println!("{}: {}", mv, nodes);
        }
        println!("\nmoves: {}  nodes: {}", results.len(), results.iter().map(|(_, nodes)| nodes).sum::<u64>());
        return Ok(());
    }

    let result = perft_detailed(&mut board, depth)?;
    println!("depth {}: {} nodes in {}ms ({} nodes/sec)", depth, result.nodes, result.time_ms, result.nodes_per_second());
    println!(
        "captures {}  en passant {}  castles {}  promotions {}  checks {}  checkmates {}",
        result.captures, result.en_passant, result.castles, result.promotions, result.checks, result.checkmates
    );
    Ok(())
}

fn benchmark(position: &PositionArgs, iterations: u64, seed: u64) -> Result<()> {
    let mut session = position.session()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let report = session.benchmark(iterations, &mut rng)?;

    println!(
        "{} plies in {:.3}s ({:.0} plies/sec)",
        report.plies,
        report.elapsed.as_secs_f64(),
        report.plies_per_second()
    );
    Ok(())
}

fn self_play(position: &PositionArgs, depth: u32, max_plies: u32, log_dir: Option<PathBuf>) -> Result<()> {
    if depth > MAX_DEPTH {
        bail!("depth {} exceeds the maximum of {}", depth, MAX_DEPTH);
    }

    let mut session = position.session()?;
    let mut log = GameLog::new();
    log.log_position(position.fen.as_deref().unwrap_or(STARTING_FEN));
    for game_move in &session.board().move_history {
        log.log_human_move(game_move.mv, game_move.mover());
    }

    for _ in 0..max_plies {
        if session.outcome() != Outcome::InProgress {
            break;
        }

        let color = session.board().current_turn;
        let start_time = Instant::now();
        let handle = session.spawn_best_move(depth).context("failed to start the search worker")?;
        let (returned, result) = handle.join().map_err(|_| anyhow!("search worker panicked"))?;
        session = returned;

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(err) => {
                log.log_game_aborted(&err.to_string());
                save_log(&mut log, log_dir.as_deref(), "search failed")?;
                return Err(err.into());
            }
        };
        let Some(mv) = analysis.best_move else {
            break;
        };
        session.apply(mv)?;
        log.log_engine_move(mv, color, analysis.valuation, analysis.nodes_visited, start_time.elapsed().as_millis());
        println!("{:>3}. {}", session.board().move_history.len(), analysis);
    }

    let status = session.board().game_status();
    log.log_outcome(status);
    println!("\n{}\n\nresult: {:?}", session.board(), session.board().outcome());

    save_log(&mut log, log_dir.as_deref(), "self-play finished")
}

fn save_log(log: &mut GameLog, log_dir: Option<&Path>, reason: &str) -> Result<()> {
    let Some(dir) = log_dir else {
        debug!(plies = log.ply_count(), "game log not saved\n{}", log.contents());
        return Ok(());
    };
    let path = log.save_to_file(dir, reason).context("failed to write game log")?;
    info!(path = %path.display(), plies = log.ply_count(), "game log saved");
    println!("log written to {}", path.display());
    Ok(())
}
