//! Score store persisted to a JSON file

use std::path::{Path, PathBuf};

use super::envelope::{read_json, write_json};
use crate::error::Result;
use crate::highscores::{HighScoreEntry, HighScores, ScoreStore};

/// Leaderboard cached in memory and rewritten on every change
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    scores: HighScores,
}

impl FileScoreStore {
    /// Open the store, starting fresh if the file is missing or unreadable
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let scores = match read_json::<HighScores>(&path) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                HighScores::new()
            }
            Err(e) => {
                log::warn!("Failed to read high scores ({e}), starting fresh");
                HighScores::new()
            }
        };
        Self { path, scores }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    fn save(&self) -> Result<()> {
        write_json(&self.path, &self.scores)?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn best(&mut self) -> Result<u32> {
        Ok(self.scores.best())
    }

    fn record(&mut self, score: u32) -> Result<u32> {
        if self.scores.add_score(score, crate::now_millis()).is_some() {
            self.save()?;
        }
        Ok(self.scores.best())
    }

    fn top(&mut self, n: usize) -> Result<Vec<HighScoreEntry>> {
        Ok(self.scores.top(n).to_vec())
    }

    fn clear(&mut self) -> Result<()> {
        self.scores.clear();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = FileScoreStore::open(&path);
        assert_eq!(store.best().unwrap(), 0);
        store.record(4).unwrap();
        assert_eq!(store.record(9).unwrap(), 9);

        let mut reopened = FileScoreStore::open(&path);
        assert_eq!(reopened.best().unwrap(), 9);
        let top: Vec<u32> = reopened.top(5).unwrap().iter().map(|e| e.score).collect();
        assert_eq!(top, vec![9, 4]);
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut store = FileScoreStore::open(&path);
        store.record(12).unwrap();
        store.clear().unwrap();
        assert_eq!(FileScoreStore::open(&path).scores().best(), 0);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "garbage").unwrap();
        let mut store = FileScoreStore::open(&path);
        assert_eq!(store.best().unwrap(), 0);
        assert_eq!(store.record(3).unwrap(), 3);
    }
}
