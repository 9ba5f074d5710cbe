//! Process-local store, used by tests and as the fallback backend

use anyhow::Result;

use super::{SavedGame, ScoreRecord, ScoreStore, StoreData};
use crate::sim::GameKind;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

impl ScoreStore for MemoryStore {
    fn submit_score(&mut self, record: ScoreRecord) -> Result<()> {
        self.data.submit(record);
        Ok(())
    }

    fn top_scores(&self, game: Option<GameKind>, limit: usize) -> Result<Vec<ScoreRecord>> {
        Ok(self.data.top(game, limit))
    }

    fn save_game(&mut self, save: SavedGame) -> Result<()> {
        self.data.save(save);
        Ok(())
    }

    fn load_game(&self, player_id: &str) -> Result<Option<SavedGame>> {
        Ok(self.data.load(player_id))
    }

    fn clear_save(&mut self, player_id: &str) -> Result<()> {
        self.data.clear(player_id);
        Ok(())
    }
}
