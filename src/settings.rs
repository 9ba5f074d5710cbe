//! Cabinet settings and preferences
//!
//! Persisted separately from scores: LocalStorage on web, a JSON file on native.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TOP_SCORES, MAX_SUBSTEPS};

/// Cabinet settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name shown on score records; falls back to the identity's name
    pub player_name: Option<String>,
    /// Rows shown on the leaderboard
    pub leaderboard_limit: usize,
    /// Cap on simulation ticks per frame
    pub max_substeps: u32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// High contrast palette
    pub high_contrast: bool,
    /// Outline placeholder rectangles drawn for missing sprites
    pub placeholder_outline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: None,
            leaderboard_limit: DEFAULT_TOP_SCORES,
            max_substeps: MAX_SUBSTEPS,

            show_fps: false,

            high_contrast: false,
            placeholder_outline: false,
        }
    }
}

impl Settings {
    /// Substep cap, never zero
    pub fn effective_max_substeps(&self) -> u32 {
        self.max_substeps.max(1)
    }

    /// Player name if one is set and not blank
    pub fn display_name(&self) -> Option<&str> {
        self.player_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_cabinet_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e:#})");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write settings as pretty JSON
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use anyhow::Context;
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
