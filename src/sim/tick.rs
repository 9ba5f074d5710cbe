//! Fixed timestep run controller
//!
//! Drives one game through the run-state machine. Games only report what
//! happened during a tick; lives, levels, the sign-in gate and score
//! submission are decided here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::state::{GameEvent, GameKind, GamePhase, Identity, RunState, StoreCommand};
use crate::consts::*;
use crate::persistence::SavedGame;
use crate::platform::InputEvent;

/// What a tick decided about the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Player died; costs one life
    LifeLost,
    /// Stage cleared; `bonus` is paid once the next level actually starts
    LevelComplete { bonus: u64 },
    /// Run ends immediately regardless of lives (crash, board full, invasion)
    Fatal,
}

/// Result of advancing a game by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub points: u64,
    pub outcome: Option<Outcome>,
}

impl Step {
    pub fn points(points: u64) -> Self {
        Self {
            points,
            outcome: None,
        }
    }

    pub fn with(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Fold a later sub-step into this one; the first outcome wins
    pub fn merge(&mut self, other: Step) {
        self.points += other.points;
        self.outcome = self.outcome.or(other.outcome);
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Per-game simulation rules
pub trait Game: Default {
    const KIND: GameKind;
    /// Pause between levels and keep a resumable save for signed-in players
    const SAVES_PROGRESS: bool = false;

    /// Build the stage for `level` (called on start, resume and advance)
    fn enter_level(&mut self, level: u32, rng: &mut Pcg32);

    /// Put entities back after a lost life; level and score are kept
    fn reset_life(&mut self, level: u32, rng: &mut Pcg32);

    /// Abstract device input; only called while playing
    fn input(&mut self, event: InputEvent);

    /// Pick a player ship before the run starts. Games without a choice
    /// refuse every index.
    fn select_ship(&mut self, _index: usize) -> bool {
        false
    }

    /// Advance one tick
    fn step(&mut self, level: u32, rng: &mut Pcg32) -> Step;

    /// Canvas size for the current stage
    fn canvas_size(&self) -> Vec2;

    /// Player bounds (for clamping checks and the HUD)
    fn player_bounds(&self) -> Aabb;
}

/// Level transition waiting on sign-in or on the continue action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLevel {
    level: u32,
    bonus: u64,
}

/// Owns the run state and one game instance
pub struct Controller<G: Game> {
    run: RunState,
    game: G,
    rng: Pcg32,
    identity: Option<Identity>,
    pending: Option<PendingLevel>,
    commands: Vec<StoreCommand>,
    events: Vec<GameEvent>,
}

impl<G: Game> Controller<G> {
    pub fn new(seed: u64) -> Self {
        Self {
            run: RunState::default(),
            game: G::default(),
            rng: Pcg32::seed_from_u64(seed),
            identity: None,
            pending: None,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Snapshot of the run state
    pub fn run(&self) -> RunState {
        self.run
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Level the run is waiting to enter, if any
    pub fn pending_level(&self) -> Option<u32> {
        self.pending.map(|p| p.level)
    }

    /// START -> PLAYING with a fresh run
    pub fn start(&mut self) {
        if self.run.phase != GamePhase::Start {
            log::debug!("{}: start ignored in {:?}", G::KIND.tag(), self.run.phase);
            return;
        }
        self.run = RunState::fresh();
        self.pending = None;
        self.enter(1);
    }

    /// START -> PLAYING from a saved game
    pub fn resume(&mut self, saved: &SavedGame) {
        if self.run.phase != GamePhase::Start {
            return;
        }
        self.run = RunState {
            score: saved.score,
            level: crate::clamp_level(saved.level),
            lives: saved.lives.clamp(1, STARTING_LIVES),
            ticks: 0,
            phase: GamePhase::Playing,
        };
        self.pending = None;
        log::info!(
            "{}: resuming at level {} (score {}, lives {})",
            G::KIND.tag(),
            self.run.level,
            self.run.score,
            self.run.lives
        );
        self.enter(self.run.level);
    }

    /// GAME_OVER/VICTORY -> START
    pub fn restart(&mut self) {
        if !self.run.phase.is_terminal() {
            return;
        }
        self.run = RunState::default();
        self.pending = None;
    }

    /// Choose the player ship; only allowed before a run starts
    pub fn select_ship(&mut self, index: usize) -> bool {
        if self.run.phase != GamePhase::Start {
            return false;
        }
        let chosen = self.game.select_ship(index);
        if chosen {
            log::info!("{}: ship {} selected", G::KIND.tag(), index);
        }
        chosen
    }

    /// Forward an input event; ignored unless playing
    pub fn input(&mut self, event: InputEvent) {
        if self.run.phase == GamePhase::Playing {
            self.game.input(event);
        }
    }

    /// Advance the simulation by one fixed tick
    pub fn tick(&mut self) {
        if self.run.phase != GamePhase::Playing {
            return;
        }
        self.run.ticks += 1;

        let step = self.game.step(self.run.level, &mut self.rng);
        self.run.score += step.points;

        match step.outcome {
            None => {}
            Some(Outcome::LifeLost) => self.lose_life(),
            Some(Outcome::Fatal) => {
                self.run.lives = 0;
                self.game_over();
            }
            Some(Outcome::LevelComplete { bonus }) => self.complete_level(bonus),
        }
    }

    /// Attach a signed-in player; resumes a transition held at the gate
    pub fn sign_in(&mut self, identity: Identity) {
        log::info!("{}: signed in as {}", G::KIND.tag(), identity.display_name);
        self.identity = Some(identity);
        if self.run.phase == GamePhase::AuthRequired {
            if let Some(pending) = self.pending.take() {
                self.apply_transition(pending);
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
    }

    /// LEVEL_TRANSITION -> PLAYING at the pending level
    pub fn continue_level(&mut self) {
        if self.run.phase != GamePhase::LevelTransition {
            return;
        }
        if let Some(pending) = self.pending.take() {
            self.enter(pending.level);
        }
    }

    /// LEVEL_TRANSITION -> START, keeping a save of the pending level
    pub fn save_and_quit(&mut self) {
        if self.run.phase != GamePhase::LevelTransition {
            return;
        }
        let level = self
            .pending
            .take()
            .map(|p| p.level)
            .unwrap_or(self.run.level + 1)
            .min(MAX_LEVEL);
        self.commands.push(StoreCommand::SaveGame {
            level,
            score: self.run.score,
            lives: self.run.lives,
        });
        self.run = RunState::default();
    }

    /// Store requests produced since the last drain
    pub fn drain_commands(&mut self) -> Vec<StoreCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn enter(&mut self, level: u32) {
        self.run.level = level;
        self.run.phase = GamePhase::Playing;
        self.game.enter_level(level, &mut self.rng);
        self.events.push(GameEvent::LevelStarted { level });
        log::info!("{}: level {} started", G::KIND.tag(), level);
    }

    fn lose_life(&mut self) {
        self.run.lives = self.run.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            lives_left: self.run.lives,
        });
        if self.run.lives == 0 {
            self.game_over();
        } else {
            self.game.reset_life(self.run.level, &mut self.rng);
        }
    }

    fn game_over(&mut self) {
        self.run.phase = GamePhase::GameOver;
        self.commands.push(StoreCommand::SubmitScore {
            game: G::KIND,
            score: self.run.score,
            level: self.run.level,
        });
        if G::SAVES_PROGRESS {
            self.commands.push(StoreCommand::ClearSave);
        }
        self.events.push(GameEvent::GameOver {
            score: self.run.score,
            level: self.run.level,
        });
        log::info!(
            "{}: game over at level {} with {} points",
            G::KIND.tag(),
            self.run.level,
            self.run.score
        );
    }

    fn complete_level(&mut self, bonus: u64) {
        let pending = PendingLevel {
            level: self.run.level + 1,
            bonus,
        };
        self.events.push(GameEvent::LevelCleared {
            level: self.run.level,
        });

        // Gate is checked only here, never mid-level
        if pending.level > AUTH_FREE_LEVELS && self.identity.is_none() {
            self.run.phase = GamePhase::AuthRequired;
            self.pending = Some(pending);
            self.events.push(GameEvent::AuthRequired {
                pending_level: pending.level,
            });
            log::info!("{}: sign-in required for level {}", G::KIND.tag(), pending.level);
            return;
        }

        self.apply_transition(pending);
    }

    fn apply_transition(&mut self, pending: PendingLevel) {
        self.run.score += pending.bonus;

        if pending.level > MAX_LEVEL {
            self.run.phase = GamePhase::Victory;
            self.commands.push(StoreCommand::SubmitScore {
                game: G::KIND,
                score: self.run.score,
                level: MAX_LEVEL,
            });
            if G::SAVES_PROGRESS {
                self.commands.push(StoreCommand::ClearSave);
            }
            self.events.push(GameEvent::Victory {
                score: self.run.score,
            });
            log::info!("{}: victory with {} points", G::KIND.tag(), self.run.score);
            return;
        }

        if G::SAVES_PROGRESS {
            self.run.phase = GamePhase::LevelTransition;
            self.pending = Some(PendingLevel { bonus: 0, ..pending });
            self.commands.push(StoreCommand::SaveGame {
                level: pending.level,
                score: self.run.score,
                lives: self.run.lives,
            });
            return;
        }

        self.enter(pending.level);
    }
}
