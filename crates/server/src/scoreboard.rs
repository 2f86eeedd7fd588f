//! Scoreboard collaborator: load and save the ranked play-through results.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One finished play-through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub lines: u32,
    pub score: u32,
}

#[derive(Debug, Error)]
pub enum ScoreboardError {
    #[error("scoreboard i/o: {0}")]
    Io(#[from] io::Error),
    #[error("scoreboard encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Storage for the ranked list. Implementations only load and save.
pub trait Scoreboard: Send + Sync {
    fn load(&self) -> Result<Vec<ScoreEntry>, ScoreboardError>;

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), ScoreboardError>;
}

/// Append `entry`, re-sort descending by score and persist.
///
/// Entries with equal scores keep their previous relative order.
pub fn record(board: &dyn Scoreboard, entry: ScoreEntry) -> Result<Vec<ScoreEntry>, ScoreboardError> {
    let mut entries = board.load()?;
    entries.push(entry);
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    board.save(&entries)?;
    Ok(entries)
}

/// JSON array on disk; a missing file reads as an empty board
#[derive(Debug, Clone)]
pub struct JsonFileScoreboard {
    path: PathBuf,
}

impl JsonFileScoreboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Scoreboard for JsonFileScoreboard {
    fn load(&self) -> Result<Vec<ScoreEntry>, ScoreboardError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), ScoreboardError> {
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Scoreboard kept in memory
#[derive(Debug, Default)]
pub struct MemoryScoreboard {
    entries: Mutex<Vec<ScoreEntry>>,
}

impl MemoryScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.entries.lock().clone()
    }
}

impl Scoreboard for MemoryScoreboard {
    fn load(&self) -> Result<Vec<ScoreEntry>, ScoreboardError> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), ScoreboardError> {
        *self.entries.lock() = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, lines: u32, score: u32) -> ScoreEntry {
        ScoreEntry {
            name: name.to_string(),
            lines,
            score,
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "telnet-arcade-{}-{}-{}.json",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn record_sorts_descending_and_keeps_ties_stable() {
        let board = MemoryScoreboard::with_entries(vec![entry("A", 5, 300), entry("B", 1, 100)]);
        let entries = record(&board, entry("C", 3, 300)).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B"]);
        assert_eq!(board.entries(), entries);
    }

    #[test]
    fn missing_file_reads_empty() {
        let board = JsonFileScoreboard::new(temp_path("missing"));
        assert!(board.load().unwrap().is_empty());
    }

    #[test]
    fn file_scoreboard_persists() {
        let path = temp_path("persist");
        let board = JsonFileScoreboard::new(&path);
        record(&board, entry("ANONYM", 0, 24)).unwrap();
        record(&board, entry("ZED", 12, 900)).unwrap();

        let reloaded = JsonFileScoreboard::new(&path).load().unwrap();
        assert_eq!(reloaded, vec![entry("ZED", 12, 900), entry("ANONYM", 0, 24)]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_is_an_encoding_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileScoreboard::new(&path).load().unwrap_err();
        assert!(matches!(err, ScoreboardError::Encoding(_)));
        let _ = fs::remove_file(path);
    }
}
