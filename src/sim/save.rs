/// Best-score persistence.
///
/// ## File format:
///   Key-value lines, currently a single `best_score=N`.
///   Unknown keys are ignored. A missing file, missing key or unparseable
///   value all read as 0.
///
/// Stored as best.dat in the data directory (see `data_dir`).

use std::path::PathBuf;

use crate::config::user_data_dir;
use crate::error::SaveError;

const BEST_FILE: &str = "best.dat";

/// Where the game reads and writes its best score.
pub trait BestScoreStore {
    fn load_best_score(&self) -> u32;
    fn save_best_score(&mut self, score: u32) -> Result<(), SaveError>;
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Directory for the save file and the log.
pub fn data_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs won't be)
            let test_path = parent.join(".write_test_reefcount");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. ~/.local/share/reefcount for system installs
    if let Some(xdg) = user_data_dir() {
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// File-backed store
// ══════════════════════════════════════════════════════════════

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore { path }
    }

    /// Store in the default data directory.
    pub fn in_data_dir() -> Self {
        FileStore::new(data_dir().join(BEST_FILE))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl BestScoreStore for FileStore {
    fn load_best_score(&self) -> u32 {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let best = parse_best(&content);
                tracing::debug!(path = %self.path.display(), best, "loaded best score");
                best
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no best score on disk");
                0
            }
        }
    }

    fn save_best_score(&mut self, score: u32) -> Result<(), SaveError> {
        std::fs::write(&self.path, serialize(score)).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

// ══════════════════════════════════════════════════════════════
// In-memory store
// ══════════════════════════════════════════════════════════════

/// Store that keeps the value in memory and counts writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub best: u32,
    pub writes: u32,
}

impl BestScoreStore for MemoryStore {
    fn load_best_score(&self) -> u32 {
        self.best
    }

    fn save_best_score(&mut self, score: u32) -> Result<(), SaveError> {
        self.best = score;
        self.writes += 1;
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize(best: u32) -> String {
    format!("best_score={}\n", best)
}

fn parse_best(content: &str) -> u32 {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("best_score="))
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(0)
}
