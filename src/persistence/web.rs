//! LocalStorage backend (web)

use anyhow::{Context, Result, anyhow};
use web_sys::Storage;

use super::{SavedGame, ScoreRecord, ScoreStore, StoreData};
use crate::sim::GameKind;

/// LocalStorage key
const STORAGE_KEY: &str = "arcade_cabinet_scores";

pub struct LocalStorageStore {
    storage: Storage,
    data: StoreData,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self> {
        let storage = web_sys::window()
            .context("no window")?
            .local_storage()
            .map_err(|e| anyhow!("local storage unavailable: {e:?}"))?
            .context("local storage disabled")?;

        let data = match storage
            .get_item(STORAGE_KEY)
            .map_err(|e| anyhow!("reading {STORAGE_KEY}: {e:?}"))?
        {
            Some(json) => {
                let data: StoreData =
                    serde_json::from_str(&json).context("parsing stored scores")?;
                log::info!("Loaded {} score records", data.scores.entries.len());
                data
            }
            None => {
                log::info!("No score records found, starting fresh");
                StoreData::default()
            }
        };
        Ok(Self { storage, data })
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string(&self.data).context("serializing scores")?;
        self.storage
            .set_item(STORAGE_KEY, &json)
            .map_err(|e| anyhow!("writing {STORAGE_KEY}: {e:?}"))
    }
}

impl ScoreStore for LocalStorageStore {
    fn submit_score(&mut self, record: ScoreRecord) -> Result<()> {
        self.data.submit(record);
        self.flush()
    }

    fn top_scores(&self, game: Option<GameKind>, limit: usize) -> Result<Vec<ScoreRecord>> {
        Ok(self.data.top(game, limit))
    }

    fn save_game(&mut self, save: SavedGame) -> Result<()> {
        self.data.save(save);
        self.flush()
    }

    fn load_game(&self, player_id: &str) -> Result<Option<SavedGame>> {
        Ok(self.data.load(player_id))
    }

    fn clear_save(&mut self, player_id: &str) -> Result<()> {
        if self.data.clear(player_id) {
            self.flush()?;
        }
        Ok(())
    }
}
