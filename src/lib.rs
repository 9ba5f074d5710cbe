//! Arcade Cabinet - six classic 2D arcade games
//!
//! Core modules:
//! - `sim`: Run-state machine, level generator, shared collision helpers
//! - `games`: Per-game entity models and tick rules
//! - `renderer`: Software bitmap canvas and per-game scenes
//! - `platform`: Input actions, frame scheduling, clocks
//! - `persistence`: Score store backends
//! - `cabinet`: Presentation shell tying a game to a store and a scheduler
//! - `wasm_game`: Browser host driving a cabinet from requestAnimationFrame

pub mod cabinet;
pub mod games;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod wasm_game;

pub use cabinet::{Arcade, Cabinet, HudSnapshot, cabinet_for};
pub use highscores::Leaderboard;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (display refresh)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Milliseconds advanced by one tick
    pub const TICK_MS: f32 = 1000.0 / TICKS_PER_SECOND as f32;
    /// Default cap on ticks run per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Last level; completing it is a victory
    pub const MAX_LEVEL: u32 = 50;
    /// Highest level reachable without a signed-in player
    pub const AUTH_FREE_LEVELS: u32 = 2;
    /// Levels per course band
    pub const COURSE_BAND: u32 = 10;
    /// Lives at the start of a run
    pub const STARTING_LIVES: u8 = 3;

    /// Default leaderboard size
    pub const DEFAULT_TOP_SCORES: usize = 10;
}

/// Clamp a level number into the generated range
#[inline]
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(1, consts::MAX_LEVEL)
}

/// Layout band for a level: 1 for levels 1-10, 2 for 11-20, ...
#[inline]
pub fn course(level: u32) -> u32 {
    clamp_level(level).div_ceil(consts::COURSE_BAND)
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Browser entry point: route `log` to the console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Arcade Cabinet (web) starting...");
}
