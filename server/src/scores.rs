//! Append-only outcome log backing the game-over leaderboard.
//!
//! One `winner:score` line per completed match. The file is cleared when a
//! fresh hosted session begins and again when a restart is honored, so the
//! leaderboard only covers the current session.

use log::warn;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

/// Entries shown on the game-over leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct ScoreLog {
    path: PathBuf,
}

impl ScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one match outcome.
    pub fn append(&self, winner: &str, score: u32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}:{}", winner, score)
    }

    /// All recorded outcomes in file order. Malformed lines are skipped with
    /// a warning; a missing file is simply an empty log.
    pub fn load(&self) -> Vec<(String, u32)> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };

        contents
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                match line.rsplit_once(':').map(|(w, s)| (w, s.parse::<u32>())) {
                    Some((winner, Ok(score))) => Some((winner.to_string(), score)),
                    _ => {
                        warn!("skipping malformed outcome line: {:?}", line);
                        None
                    }
                }
            })
            .collect()
    }

    /// The top `n` outcomes, highest score first.
    pub fn top(&self, n: usize) -> Vec<(String, u32)> {
        let mut outcomes = self.load();
        outcomes.sort_by(|a, b| b.1.cmp(&a.1));
        outcomes.truncate(n);
        outcomes
    }

    /// Drops every recorded outcome. A log that never existed is fine.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
