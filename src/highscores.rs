//! High score leaderboard
//!
//! One ranked table across all games. Records are kept sorted by descending
//! score; ties keep submission order. Nothing is ever removed.

use serde::{Deserialize, Serialize};

use crate::persistence::ScoreRecord;
use crate::sim::GameKind;

/// Ranked score records
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Leaderboard {
    pub entries: Vec<ScoreRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert keeping descending order; returns the 1-indexed rank within
    /// the record's game
    pub fn insert(&mut self, record: ScoreRecord) -> usize {
        let game = record.game_type;
        let pos = self
            .entries
            .iter()
            .position(|e| record.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
        self.entries[..=pos]
            .iter()
            .filter(|e| e.game_type == game)
            .count()
    }

    /// Best records, optionally for one game
    pub fn top(&self, game: Option<GameKind>, limit: usize) -> impl Iterator<Item = &ScoreRecord> {
        self.entries
            .iter()
            .filter(move |e| game.is_none_or(|g| e.game_type == g))
            .take(limit)
    }

    /// Rank a score would achieve (1-indexed, None if outside the top `limit`)
    pub fn potential_rank(&self, game: GameKind, score: u64, limit: usize) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .filter(|e| e.game_type == game && e.score >= score)
            .count()
            + 1;
        (rank <= limit).then_some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score for a game (if any)
    pub fn top_score(&self, game: GameKind) -> Option<u64> {
        self.top(Some(game), 1).next().map(|e| e.score)
    }
}
