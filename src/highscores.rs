//! High score leaderboard system
//!
//! Tracks the top 10 finished runs. The game only ever asks for the best
//! score; the score screen shows the top 5.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;
use crate::error::Result;

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Obstacles passed
    pub score: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the leaderboard.
    ///
    /// Ties go to the newer run, so matching the lowest entry of a full table
    /// is enough.
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score >= e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score >= e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(rank - 1, HighScoreEntry { score, timestamp });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Best score recorded, 0 when empty
    pub fn best(&self) -> u32 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    /// Up to `n` highest entries
    pub fn top(&self, n: usize) -> &[HighScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Durable record of finished runs
///
/// Calls may block on IO; the game never calls a store directly, only through
/// [`crate::services::ScoreService`].
pub trait ScoreStore: Send {
    fn best(&mut self) -> Result<u32>;
    /// Record a finished run and return the resulting best score
    fn record(&mut self, score: u32) -> Result<u32>;
    fn top(&mut self, n: usize) -> Result<Vec<HighScoreEntry>>;
    fn clear(&mut self) -> Result<()>;
}

/// In-memory store
impl ScoreStore for HighScores {
    fn best(&mut self) -> Result<u32> {
        Ok(HighScores::best(self))
    }

    fn record(&mut self, score: u32) -> Result<u32> {
        self.add_score(score, crate::now_millis());
        Ok(HighScores::best(self))
    }

    fn top(&mut self, n: usize) -> Result<Vec<HighScoreEntry>> {
        Ok(HighScores::top(self, n).to_vec())
    }

    fn clear(&mut self) -> Result<()> {
        HighScores::clear(self);
        Ok(())
    }
}
