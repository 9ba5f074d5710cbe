//! JSON file backend (native)
//!
//! The whole store is one JSON document. Writes go to `<path>.tmp` first and
//! are renamed over the real file, so a crash mid-write leaves the previous
//! contents intact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{SavedGame, ScoreRecord, ScoreStore, StoreData};
use crate::sim::GameKind;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    /// Open a store file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading score store {}", path.display()))?;
            let data: StoreData = serde_json::from_str(&json)
                .with_context(|| format!("parsing score store {}", path.display()))?;
            log::info!(
                "Loaded {} score records from {}",
                data.scores.entries.len(),
                path.display()
            );
            data
        } else {
            log::info!("No score store at {}, starting fresh", path.display());
            StoreData::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.data).context("serializing score store")?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arcade-cabinet-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_records_survive_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .submit_score(ScoreRecord::new("u", "Ada", GameKind::Frogger, 1050, 2, 1))
            .unwrap();
        store.save_game(SavedGame::new("u", 3, 1050, 2, 1)).unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        let top = store.top_scores(Some(GameKind::Frogger), 10).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].score, 1050);
        assert_eq!(store.load_game("u").unwrap().map(|s| s.level), Some(3));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing score store"));
        let _ = fs::remove_file(&path);
    }
}
