use crate::{color_name, GameStatus, Move};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript of one game: moves, undos and how it ended.
#[derive(Debug)]
pub struct GameLog {
    log_buffer: String,
    started_at: DateTime<Local>,
    ply_count: u32,
}

impl GameLog {
    pub fn new() -> Self {
        let started_at = Local::now();
        let mut log = Self { log_buffer: String::with_capacity(16 * 1024), started_at, ply_count: 0 };

        log.log("=== Game Log Started ===");
        log.log(&format!("Date: {}", started_at.format("%m/%d/%Y %H:%M:%S")));
        log
    }

    pub fn log(&mut self, message: &str) {
        self.log_buffer.push_str(message);
        self.log_buffer.push('\n');
    }

    pub fn contents(&self) -> &str {
        &self.log_buffer
    }

    pub fn ply_count(&self) -> u32 {
        self.ply_count
    }

    pub fn log_position(&mut self, fen: &str) {
        self.log(&format!("Position: {}", fen));
    }

    pub fn log_human_move(&mut self, mv: Move, color: u8) {
        self.ply_count += 1;
        self.log(&format!("{:>3}. {} plays {}", self.ply_count, color_name(color), mv));
    }

    pub fn log_engine_move(&mut self, mv: Move, color: u8, valuation: f64, nodes: u64, time_ms: u128) {
        self.ply_count += 1;
        self.log(&format!(
            "{:>3}. {} plays {} (eval {:+.3}, {} nodes, {}ms)",
            self.ply_count,
            color_name(color),
            mv,
            valuation,
            nodes,
            time_ms
        ));
    }

    pub fn log_outcome(&mut self, status: GameStatus) {
        let summary = match status {
            GameStatus::InProgress => "game in progress".to_string(),
            GameStatus::Checkmate(loser) => format!("checkmate, {} is mated", color_name(loser)),
            GameStatus::Stalemate => "draw by stalemate".to_string(),
            GameStatus::Draw(reason) => format!("draw ({:?})", reason),
        };
        self.log(&format!("Result: {}", summary));
    }

    pub fn log_game_aborted(&mut self, reason: &str) {
        self.log(&format!("Game aborted: {}", reason));
    }

    /// Write the transcript to `<dir>/<timestamp>.txt` and return the path.
    pub fn save_to_file(&mut self, dir: &Path, reason: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let filename = dir.join(format!("{}.txt", Local::now().format("%m_%d_%Y_%H_%M_%S")));
        let elapsed = Local::now().signed_duration_since(self.started_at);
        self.log(&format!("Game ended: {} after {}s - saving log", reason, elapsed.num_seconds()));

        let mut file = File::create(&filename)?;
        file.write_all(self.log_buffer.as_bytes())?;
        Ok(filename)
    }
}

impl Default for GameLog {
    fn default() -> Self {
        Self::new()
    }
}
