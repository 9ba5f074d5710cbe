//! Score persistence
//!
//! Features:
//! - Append-only score records, ranked per game type
//! - One resumable saved game per player (upsert)
//! - In-memory, JSON file (native) and LocalStorage (web) backends
//!
//! Callers treat every operation as fire-and-forget; failures come back as
//! `anyhow::Error` and are logged by the shell, never retried.

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::highscores::Leaderboard;
use crate::sim::GameKind;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Player id used for submissions without a signed-in identity
pub const ANONYMOUS_ID: &str = "anonymous";
/// Display name of last resort
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// One finished run. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub player_id: String,
    pub player_name: String,
    pub game_type: GameKind,
    pub score: u64,
    /// Level reached (1..=50)
    pub level: u32,
    /// Epoch milliseconds
    pub timestamp: u64,
}

impl ScoreRecord {
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        game_type: GameKind,
        score: u64,
        level: u32,
        timestamp: u64,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            game_type,
            score,
            level: crate::clamp_level(level),
            timestamp,
        }
    }
}

/// Resume point for a signed-in player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub player_id: String,
    pub level: u32,
    pub score: u64,
    pub lives: u8,
    pub timestamp: u64,
}

impl SavedGame {
    pub fn new(player_id: impl Into<String>, level: u32, score: u64, lives: u8, timestamp: u64) -> Self {
        Self {
            player_id: player_id.into(),
            level: crate::clamp_level(level),
            score,
            lives,
            timestamp,
        }
    }
}

/// Port for the score store
pub trait ScoreStore {
    /// Append a record
    fn submit_score(&mut self, record: ScoreRecord) -> Result<()>;

    /// Records in descending score order, optionally for one game, capped at `limit`
    fn top_scores(&self, game: Option<GameKind>, limit: usize) -> Result<Vec<ScoreRecord>>;

    /// Insert or replace the player's saved game
    fn save_game(&mut self, save: SavedGame) -> Result<()>;

    fn load_game(&self, player_id: &str) -> Result<Option<SavedGame>>;

    fn clear_save(&mut self, player_id: &str) -> Result<()>;
}

/// Everything a backend keeps, serialized as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    pub scores: Leaderboard,
    #[serde(default)]
    pub saves: BTreeMap<String, SavedGame>,
}

impl StoreData {
    pub fn submit(&mut self, record: ScoreRecord) -> usize {
        self.scores.insert(record)
    }

    pub fn top(&self, game: Option<GameKind>, limit: usize) -> Vec<ScoreRecord> {
        self.scores.top(game, limit).cloned().collect()
    }

    pub fn save(&mut self, save: SavedGame) {
        self.saves.insert(save.player_id.clone(), save);
    }

    pub fn load(&self, player_id: &str) -> Option<SavedGame> {
        self.saves.get(player_id).cloned()
    }

    pub fn clear(&mut self, player_id: &str) -> bool {
        self.saves.remove(player_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_is_camel_case() {
        let record = ScoreRecord::new("u1", "Ada", GameKind::DonkeyKong, 1200, 4, 99);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["playerId"], "u1");
        assert_eq!(json["playerName"], "Ada");
        assert_eq!(json["gameType"], "donkey-kong");
        assert_eq!(json["timestamp"], 99);
    }

    #[test]
    fn test_record_level_is_clamped() {
        assert_eq!(ScoreRecord::new("u", "n", GameKind::Racing, 1, 0, 0).level, 1);
        assert_eq!(ScoreRecord::new("u", "n", GameKind::Racing, 1, 77, 0).level, 50);
    }

    #[test]
    fn test_save_upserts_by_player() {
        let mut data = StoreData::default();
        data.save(SavedGame::new("u1", 3, 100, 2, 1));
        data.save(SavedGame::new("u1", 5, 900, 1, 2));
        data.save(SavedGame::new("u2", 2, 10, 3, 3));
        assert_eq!(data.saves.len(), 2);
        assert_eq!(data.load("u1").map(|s| s.level), Some(5));
        assert!(data.clear("u1"));
        assert!(!data.clear("u1"));
        assert_eq!(data.load("u1"), None);
    }
}
