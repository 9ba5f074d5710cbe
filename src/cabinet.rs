//! Presentation shell
//!
//! `Cabinet` ties one game's controller to a frame scheduler, a score store
//! and a canvas. The host calls `frame` with the handle it was given; the
//! cabinet runs fixed ticks from a time accumulator, dispatches the
//! controller's store commands and redraws. A new handle is issued only
//! while the run is playing.

use serde::Serialize;

use crate::consts::TICK_MS;
use crate::games::{Blocks, Climber, Frogger, Invaders, Maze, Racing};
use crate::highscores::Leaderboard;
use crate::persistence::{ANONYMOUS_ID, ANONYMOUS_NAME, SavedGame, ScoreRecord, ScoreStore};
use crate::platform::{Clock, FrameScheduler, InputEvent, SystemClock, TickHandle};
use crate::renderer::{Canvas, Scene, SpriteSheet};
use crate::settings::Settings;
use crate::sim::{Controller, Game, GameEvent, GameKind, GamePhase, Identity, StoreCommand};

/// Longest frame gap fed to the accumulator
const MAX_FRAME_MS: f64 = 100.0;
const FPS_WINDOW: usize = 60;

/// Copy of what the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub game: GameKind,
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    pub pending_level: Option<u32>,
    pub player_name: Option<String>,
    /// Best score on the board for this game
    pub high_score: Option<u64>,
    /// Rank reached by the last submitted score
    pub last_rank: Option<usize>,
    pub fps: Option<u32>,
}

pub struct Cabinet<G: Game + Scene> {
    controller: Controller<G>,
    scheduler: FrameScheduler,
    store: Box<dyn ScoreStore>,
    clock: Box<dyn Clock>,
    settings: Settings,
    sprites: SpriteSheet,
    canvas: Canvas,
    accumulator: f64,
    last_time: Option<f64>,
    // FPS tracking
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
    last_rank: Option<usize>,
    high_score: Option<u64>,
}

impl<G: Game + Scene> Cabinet<G> {
    pub fn new(seed: u64, store: Box<dyn ScoreStore>, settings: Settings) -> Self {
        let controller = Controller::<G>::new(seed);
        let canvas = Canvas::for_size(controller.game().canvas_size());
        let sprites = SpriteSheet {
            placeholder_outline: settings.placeholder_outline,
            ..Default::default()
        };
        let mut cabinet = Self {
            controller,
            scheduler: FrameScheduler::new(),
            store,
            clock: Box::new(SystemClock),
            settings,
            sprites,
            canvas,
            accumulator: 0.0,
            last_time: None,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
            last_rank: None,
            high_score: None,
        };
        cabinet.refresh_high_score();
        cabinet
    }

    /// Replace the timestamp source (tests, replays of a fixed session)
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_sprites(&mut self, mut sprites: SpriteSheet) {
        sprites.placeholder_outline = self.settings.placeholder_outline;
        self.sprites = sprites;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game(&self) -> &G {
        self.controller.game()
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Handle the host should call back with, if a frame is scheduled
    pub fn pending_frame(&self) -> Option<TickHandle> {
        self.scheduler.pending()
    }

    pub fn start(&mut self) -> Option<TickHandle> {
        self.controller.start();
        self.settle()
    }

    /// Resume the signed-in player's saved game, if there is one
    pub fn resume_saved(&mut self) -> Option<TickHandle> {
        if !G::SAVES_PROGRESS {
            return None;
        }
        let save = self.load_save()?;
        self.controller.resume(&save);
        self.settle()
    }

    /// Saved game for the signed-in player
    pub fn load_save(&self) -> Option<SavedGame> {
        let id = self.controller.identity()?;
        match self.store.load_game(&id.player_id) {
            Ok(save) => save,
            Err(e) => {
                log::warn!("Failed to load saved game for {}: {e:#}", id.player_id);
                None
            }
        }
    }

    pub fn sign_in(&mut self, identity: Identity) -> Option<TickHandle> {
        self.controller.sign_in(identity);
        self.settle()
    }

    pub fn sign_out(&mut self) {
        self.controller.sign_out();
    }

    pub fn input(&mut self, event: InputEvent) {
        self.controller.input(event);
    }

    pub fn continue_level(&mut self) -> Option<TickHandle> {
        self.controller.continue_level();
        self.settle()
    }

    pub fn save_and_quit(&mut self) {
        self.controller.save_and_quit();
        self.settle();
    }

    /// Choose the player ship on the start screen
    pub fn select_ship(&mut self, index: usize) -> bool {
        let chosen = self.controller.select_ship(index);
        if chosen {
            self.render();
        }
        chosen
    }

    pub fn restart(&mut self) {
        self.controller.restart();
        self.settle();
    }

    /// Events since the last call, for overlays and sounds
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.controller.drain_events()
    }

    /// Run one host frame. Returns the next handle while playing; a stale
    /// handle does nothing and returns `None`.
    pub fn frame(&mut self, handle: TickHandle, time_ms: f64) -> Option<TickHandle> {
        if !self.scheduler.fire(handle) {
            return None;
        }

        let dt = match self.last_time {
            Some(last) => (time_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => TICK_MS as f64,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt;

        let tick_ms = TICK_MS as f64;
        let mut substeps = 0;
        while self.accumulator >= tick_ms
            && substeps < self.settings.effective_max_substeps()
            && self.controller.phase() == GamePhase::Playing
        {
            self.controller.tick();
            self.accumulator -= tick_ms;
            substeps += 1;
        }

        self.track_fps(time_ms);
        self.render();
        self.settle()
    }

    /// Redraw the current state
    pub fn render(&mut self) {
        self.canvas.fit(self.controller.game().canvas_size());
        self.controller.game().draw(&mut self.canvas, &self.sprites);
        if self.settings.high_contrast {
            self.canvas.boost_contrast();
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        let run = self.controller.run();
        HudSnapshot {
            game: G::KIND,
            phase: run.phase,
            score: run.score,
            level: run.level,
            lives: run.lives,
            pending_level: self.controller.pending_level(),
            player_name: self.player_name(),
            high_score: self.high_score,
            last_rank: self.last_rank,
            fps: self.settings.show_fps.then_some(self.fps),
        }
    }

    /// Leaderboard rows for this game; store errors read as an empty board
    pub fn top_scores(&self) -> Vec<ScoreRecord> {
        self.store
            .top_scores(Some(G::KIND), self.settings.leaderboard_limit)
            .unwrap_or_else(|e| {
                log::warn!("Failed to read leaderboard: {e:#}");
                Vec::new()
            })
    }

    fn player_name(&self) -> Option<String> {
        self.settings
            .display_name()
            .or(self.controller.identity().map(|id| id.display_name.as_str()))
            .map(str::to_owned)
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && time > oldest {
            self.fps = (FPS_WINDOW as f64 * 1000.0 / (time - oldest)).round() as u32;
        }
    }

    /// Dispatch store commands and keep the scheduler in step with the phase
    fn settle(&mut self) -> Option<TickHandle> {
        for command in self.controller.drain_commands() {
            self.dispatch(command);
        }

        if self.controller.phase() == GamePhase::Playing {
            Some(self.scheduler.schedule())
        } else {
            if self.scheduler.cancel().is_some() {
                log::debug!("Frame loop stopped in {:?}", self.controller.phase());
            }
            self.accumulator = 0.0;
            self.last_time = None;
            None
        }
    }

    fn dispatch(&mut self, command: StoreCommand) {
        let now = self.clock.epoch_ms();
        let identity = self.controller.identity().cloned();

        match command {
            StoreCommand::SubmitScore { game, score, level } => {
                let (player_id, identity_name) = match &identity {
                    Some(id) => (id.player_id.as_str(), Some(id.display_name.as_str())),
                    None => (ANONYMOUS_ID, None),
                };
                let name = self
                    .settings
                    .display_name()
                    .or(identity_name)
                    .unwrap_or(ANONYMOUS_NAME);

                self.last_rank = self
                    .store
                    .top_scores(Some(game), self.settings.leaderboard_limit)
                    .ok()
                    .and_then(|entries| {
                        Leaderboard { entries }.potential_rank(
                            game,
                            score,
                            self.settings.leaderboard_limit,
                        )
                    });

                let record = ScoreRecord::new(player_id, name, game, score, level, now);
                match self.store.submit_score(record) {
                    Ok(()) => {
                        log::info!("Submitted {} points for {} ({})", score, name, game.tag());
                        self.refresh_high_score();
                    }
                    Err(e) => log::warn!("Failed to submit score: {e:#}"),
                }
            }
            StoreCommand::SaveGame { level, score, lives } => {
                let Some(id) = identity else {
                    log::debug!("Not saving: no signed-in player");
                    return;
                };
                let save = SavedGame::new(id.player_id, level, score, lives, now);
                if let Err(e) = self.store.save_game(save) {
                    log::warn!("Failed to save game: {e:#}");
                }
            }
            StoreCommand::ClearSave => {
                let Some(id) = identity else {
                    return;
                };
                if let Err(e) = self.store.clear_save(&id.player_id) {
                    log::warn!("Failed to clear saved game: {e:#}");
                }
            }
        }
    }

    fn refresh_high_score(&mut self) {
        self.high_score = self
            .store
            .top_scores(Some(G::KIND), 1)
            .ok()
            .and_then(|entries| Leaderboard { entries }.top_score(G::KIND));
    }
}

/// A cabinet with its game type erased, for hosts that pick the game at runtime
pub trait Arcade {
    fn kind(&self) -> GameKind;
    fn phase(&self) -> GamePhase;
    fn canvas(&self) -> &Canvas;
    fn start(&mut self) -> Option<TickHandle>;
    fn resume_saved(&mut self) -> Option<TickHandle>;
    fn sign_in(&mut self, identity: Identity) -> Option<TickHandle>;
    fn sign_out(&mut self);
    fn select_ship(&mut self, index: usize) -> bool;
    fn input(&mut self, event: InputEvent);
    fn continue_level(&mut self) -> Option<TickHandle>;
    fn save_and_quit(&mut self);
    fn restart(&mut self);
    fn frame(&mut self, handle: TickHandle, time_ms: f64) -> Option<TickHandle>;
    fn render(&mut self);
    fn hud(&self) -> HudSnapshot;
    fn top_scores(&self) -> Vec<ScoreRecord>;
    fn drain_events(&mut self) -> Vec<GameEvent>;
}

impl<G: Game + Scene> Arcade for Cabinet<G> {
    fn kind(&self) -> GameKind {
        G::KIND
    }
    fn phase(&self) -> GamePhase {
        Cabinet::phase(self)
    }
    fn canvas(&self) -> &Canvas {
        Cabinet::canvas(self)
    }
    fn start(&mut self) -> Option<TickHandle> {
        Cabinet::start(self)
    }
    fn resume_saved(&mut self) -> Option<TickHandle> {
        Cabinet::resume_saved(self)
    }
    fn sign_in(&mut self, identity: Identity) -> Option<TickHandle> {
        Cabinet::sign_in(self, identity)
    }
    fn sign_out(&mut self) {
        Cabinet::sign_out(self)
    }
    fn select_ship(&mut self, index: usize) -> bool {
        Cabinet::select_ship(self, index)
    }
    fn input(&mut self, event: InputEvent) {
        Cabinet::input(self, event)
    }
    fn continue_level(&mut self) -> Option<TickHandle> {
        Cabinet::continue_level(self)
    }
    fn save_and_quit(&mut self) {
        Cabinet::save_and_quit(self)
    }
    fn restart(&mut self) {
        Cabinet::restart(self)
    }
    fn frame(&mut self, handle: TickHandle, time_ms: f64) -> Option<TickHandle> {
        Cabinet::frame(self, handle, time_ms)
    }
    fn render(&mut self) {
        Cabinet::render(self)
    }
    fn hud(&self) -> HudSnapshot {
        Cabinet::hud(self)
    }
    fn top_scores(&self) -> Vec<ScoreRecord> {
        Cabinet::top_scores(self)
    }
    fn drain_events(&mut self) -> Vec<GameEvent> {
        Cabinet::drain_events(self)
    }
}

/// Build the cabinet for a game chosen at runtime
pub fn cabinet_for(
    kind: GameKind,
    seed: u64,
    store: Box<dyn ScoreStore>,
    settings: Settings,
) -> Box<dyn Arcade> {
    match kind {
        GameKind::SpaceInvaders => Box::new(Cabinet::<Invaders>::new(seed, store, settings)),
        GameKind::Tetris => Box::new(Cabinet::<Blocks>::new(seed, store, settings)),
        GameKind::Pacman => Box::new(Cabinet::<Maze>::new(seed, store, settings)),
        GameKind::DonkeyKong => Box::new(Cabinet::<Climber>::new(seed, store, settings)),
        GameKind::Frogger => Box::new(Cabinet::<Frogger>::new(seed, store, settings)),
        GameKind::Racing => Box::new(Cabinet::<Racing>::new(seed, store, settings)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Result, bail};
    use glam::Vec2;

    use super::*;
    use crate::games::frogger;
    use crate::games::{Blocks, Frogger, Invaders};
    use crate::persistence::MemoryStore;
    use crate::platform::{Action, ManualClock};

    /// Store shared with the test so records can be inspected afterwards
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl ScoreStore for SharedStore {
        fn submit_score(&mut self, record: ScoreRecord) -> Result<()> {
            self.0.borrow_mut().submit_score(record)
        }
        fn top_scores(&self, game: Option<GameKind>, limit: usize) -> Result<Vec<ScoreRecord>> {
            self.0.borrow().top_scores(game, limit)
        }
        fn save_game(&mut self, save: SavedGame) -> Result<()> {
            self.0.borrow_mut().save_game(save)
        }
        fn load_game(&self, player_id: &str) -> Result<Option<SavedGame>> {
            self.0.borrow().load_game(player_id)
        }
        fn clear_save(&mut self, player_id: &str) -> Result<()> {
            self.0.borrow_mut().clear_save(player_id)
        }
    }

    struct FailingStore;

    impl ScoreStore for FailingStore {
        fn submit_score(&mut self, _: ScoreRecord) -> Result<()> {
            bail!("offline")
        }
        fn top_scores(&self, _: Option<GameKind>, _: usize) -> Result<Vec<ScoreRecord>> {
            bail!("offline")
        }
        fn save_game(&mut self, _: SavedGame) -> Result<()> {
            bail!("offline")
        }
        fn load_game(&self, _: &str) -> Result<Option<SavedGame>> {
            bail!("offline")
        }
        fn clear_save(&mut self, _: &str) -> Result<()> {
            bail!("offline")
        }
    }

    fn cabinet<G: Game + Scene>(store: Box<dyn ScoreStore>) -> Cabinet<G> {
        Cabinet::<G>::new(7, store, Settings::default()).with_clock(Box::new(ManualClock::new(1_000)))
    }

    /// Drive frames 1/60 s apart until the run stops playing
    fn play_out<G: Game + Scene>(cab: &mut Cabinet<G>, limit: usize) {
        let mut handle = cab.pending_frame();
        let mut t = cab.last_time.unwrap_or(0.0);
        for _ in 0..limit {
            let Some(h) = handle else { break };
            t += TICK_MS as f64;
            handle = cab.frame(h, t);
        }
    }

    /// Frogger run where the frog walks into traffic every life
    fn doomed_frogger(store: Box<dyn ScoreStore>) -> Cabinet<Frogger> {
        let mut cab = cabinet::<Frogger>(store);
        let handle = cab.start();
        assert!(handle.is_some());
        // Timer expiry costs a life; shorten it
        for _ in 0..3 {
            cab.controller.game_mut().ticks_left = 2;
            play_out(&mut cab, 4);
        }
        cab
    }

    #[test]
    fn test_start_schedules_frame() {
        let mut cab = cabinet::<Blocks>(Box::new(MemoryStore::new()));
        assert_eq!(cab.pending_frame(), None);
        let handle = cab.start();
        assert_eq!(cab.pending_frame(), handle);
        assert_eq!(cab.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut cab = cabinet::<Blocks>(Box::new(MemoryStore::new()));
        let Some(first) = cab.start() else {
            panic!("not scheduled");
        };
        let second = cab.frame(first, 0.0);
        assert!(second.is_some());
        // Replaying the consumed handle does nothing
        assert_eq!(cab.frame(first, 16.0), None);
        assert_eq!(cab.pending_frame(), second);
    }

    #[test]
    fn test_substeps_capped_per_frame() {
        let mut cab = cabinet::<Blocks>(Box::new(MemoryStore::new()));
        let Some(h) = cab.start() else {
            panic!("not scheduled");
        };
        let Some(h) = cab.frame(h, 0.0) else {
            panic!("stopped");
        };
        let before = cab.controller.run().ticks;
        // A long stall only runs the capped number of ticks
        cab.frame(h, 5_000.0);
        assert_eq!(cab.controller.run().ticks - before, 4);
    }

    #[test]
    fn test_game_over_submits_anonymous_once() {
        let store = SharedStore::default();
        let mut cab = doomed_frogger(Box::new(store.clone()));
        assert_eq!(cab.phase(), GamePhase::GameOver);
        assert_eq!(cab.pending_frame(), None);

        let records = store.0.borrow().top_scores(None, 10).unwrap_or_default();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_id, ANONYMOUS_ID);
        assert_eq!(records[0].player_name, ANONYMOUS_NAME);
        assert_eq!(records[0].game_type, GameKind::Frogger);
        assert_eq!(records[0].timestamp, 1_000);

        // Further frames and restarts never submit again
        cab.restart();
        assert_eq!(cab.phase(), GamePhase::Start);
        assert_eq!(store.0.borrow().data().scores.entries.len(), 1);
    }

    #[test]
    fn test_store_failure_is_swallowed() {
        let mut cab = doomed_frogger(Box::new(FailingStore));
        assert_eq!(cab.phase(), GamePhase::GameOver);
        assert!(cab.top_scores().is_empty());
        assert_eq!(cab.hud().high_score, None);
        cab.restart();
        assert!(cab.start().is_some());
    }

    #[test]
    fn test_settings_name_wins() {
        let store = SharedStore::default();
        let settings = Settings {
            player_name: Some("  Ace ".into()),
            ..Default::default()
        };
        let mut cab = Cabinet::<Frogger>::new(1, Box::new(store.clone()), settings);
        cab.sign_in(Identity::new("user|9", "Nine"));
        cab.start();
        // One hop from home for 50 points
        cab.controller.game_mut().frog = Vec2::new(7.0 * frogger::GRID, frogger::GRID);
        cab.input(InputEvent::press(Action::Up));
        play_out(&mut cab, 1);
        assert_eq!(cab.hud().score, frogger::HOME_POINTS);
        for _ in 0..3 {
            cab.controller.game_mut().ticks_left = 2;
            play_out(&mut cab, 4);
        }
        let records = store.0.borrow().top_scores(None, 10).unwrap_or_default();
        assert_eq!(records[0].player_id, "user|9");
        assert_eq!(records[0].player_name, "Ace");
        assert_eq!(records[0].score, frogger::HOME_POINTS);
        assert_eq!(cab.hud().last_rank, Some(1));
        assert_eq!(cab.hud().high_score, Some(frogger::HOME_POINTS));
    }

    #[test]
    fn test_input_reaches_game_only_while_playing() {
        let mut cab = cabinet::<Frogger>(Box::new(MemoryStore::new()));
        let start = cab.game().frog;
        cab.input(InputEvent::press(Action::Up));
        assert_eq!(cab.game().frog, start);
        cab.start();
        let start = cab.game().frog;
        cab.input(InputEvent::press(Action::Up));
        assert!(cab.game().frog.y < start.y);
    }

    #[test]
    fn test_invaders_save_resume_cycle() {
        let store = SharedStore::default();
        let mut cab = cabinet::<Invaders>(Box::new(store.clone()));
        cab.sign_in(Identity::new("user|1", "One"));
        cab.start();

        // Clear the formation so the next tick completes the level
        for enemy in &mut cab.controller.game_mut().enemies {
            enemy.active = false;
        }
        play_out(&mut cab, 2);
        assert_eq!(cab.phase(), GamePhase::LevelTransition);
        assert_eq!(cab.pending_frame(), None);

        cab.save_and_quit();
        assert_eq!(cab.phase(), GamePhase::Start);
        let Some(save) = cab.load_save() else {
            panic!("no save written");
        };
        assert_eq!((save.level, save.lives), (2, 3));

        assert!(cab.resume_saved().is_some());
        assert_eq!(cab.hud().level, 2);
        assert_eq!(cab.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_saves_skipped_when_anonymous() {
        let store = SharedStore::default();
        let mut cab = cabinet::<Invaders>(Box::new(store.clone()));
        cab.start();
        for enemy in &mut cab.controller.game_mut().enemies {
            enemy.active = false;
        }
        play_out(&mut cab, 2);
        assert_eq!(cab.phase(), GamePhase::LevelTransition);
        cab.save_and_quit();
        assert!(store.0.borrow().data().saves.is_empty());
        assert_eq!(cab.resume_saved(), None);
    }

    #[test]
    fn test_ship_chosen_on_start_screen_only() {
        let mut cab = cabinet::<Invaders>(Box::new(MemoryStore::new()));
        assert!(cab.select_ship(1));
        cab.start();
        assert!(!cab.select_ship(2));
        assert_eq!(cab.game().ship, 1);

        let mut blocks = cabinet::<Blocks>(Box::new(MemoryStore::new()));
        assert!(!blocks.select_ship(0));
    }

    #[test]
    fn test_hud_snapshot() {
        let settings = Settings {
            show_fps: true,
            ..Default::default()
        };
        let mut cab = Cabinet::<Blocks>::new(3, Box::new(MemoryStore::new()), settings);
        let hud = cab.hud();
        assert_eq!((hud.phase, hud.lives, hud.level), (GamePhase::Start, 3, 1));
        assert_eq!(hud.fps, Some(0));
        cab.start();
        assert_eq!(cab.hud().game, GameKind::Tetris);
    }

    #[test]
    fn test_render_fits_canvas_to_game() {
        let mut cab = cabinet::<Invaders>(Box::new(MemoryStore::new()));
        cab.start();
        cab.render();
        assert_eq!((cab.canvas().width(), cab.canvas().height()), (800, 600));
    }

    #[test]
    fn test_cabinet_for_every_kind() {
        for kind in GameKind::ALL {
            let mut cab = cabinet_for(kind, 5, Box::new(MemoryStore::new()), Settings::default());
            assert_eq!(cab.kind(), kind);
            assert_eq!(cab.phase(), GamePhase::Start);
            let handle = cab.start().expect("playing after start");
            assert!(cab.frame(handle, 0.0).is_some());
            assert_eq!(cab.hud().game, kind);
        }
    }

    #[test]
    fn test_hud_serializes_for_web_host() -> Result<()> {
        let mut cab = cabinet_for(GameKind::Frogger, 1, Box::new(MemoryStore::new()), Settings::default());
        assert!(!cab.select_ship(0));
        cab.start();
        let json = serde_json::to_value(cab.hud())?;
        assert_eq!(json["game"], "frogger");
        assert_eq!(json["lives"], 3);
        assert!(json.get("pendingLevel").is_some());
        assert!(json.get("lastRank").is_some());
        Ok(())
    }
}
