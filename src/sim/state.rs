//! Run state and the types shared by every game
//!
//! The controller owns the only mutable `RunState`; everything the
//! presentation layer sees is a copy.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which cabinet a record or run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    SpaceInvaders,
    Tetris,
    Pacman,
    DonkeyKong,
    Frogger,
    Racing,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::SpaceInvaders,
        GameKind::Tetris,
        GameKind::Pacman,
        GameKind::DonkeyKong,
        GameKind::Frogger,
        GameKind::Racing,
    ];

    /// Game-type tag used by the score store
    pub fn tag(&self) -> &'static str {
        match self {
            GameKind::SpaceInvaders => "space-invaders",
            GameKind::Tetris => "tetris",
            GameKind::Pacman => "pacman",
            GameKind::DonkeyKong => "donkey-kong",
            GameKind::Frogger => "frogger",
            GameKind::Racing => "racing",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.tag() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::SpaceInvaders => "SPACE INVADERS",
            GameKind::Tetris => "TETRIS",
            GameKind::Pacman => "PAC-MAN",
            GameKind::DonkeyKong => "DONKEY KONG",
            GameKind::Frogger => "FROGGER",
            GameKind::Racing => "RACING",
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the start action
    Start,
    /// Active gameplay
    Playing,
    /// Between levels, waiting for continue or save-and-quit
    LevelTransition,
    /// Next level is locked until a player signs in
    AuthRequired,
    /// Run ended by losing
    GameOver,
    /// Run ended by clearing the last level
    Victory,
}

impl GamePhase {
    /// Run is over and only a restart leaves this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Score, level and lives for one play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Current level (1..=MAX_LEVEL)
    pub level: u32,
    pub lives: u8,
    /// Ticks simulated this run
    pub ticks: u64,
    pub phase: GamePhase,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            lives: STARTING_LIVES,
            ticks: 0,
            phase: GamePhase::Start,
        }
    }
}

impl RunState {
    /// Fresh state for a new run, already playing
    pub fn fresh() -> Self {
        Self {
            phase: GamePhase::Playing,
            ..Self::default()
        }
    }
}

/// Signed-in player supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub player_id: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(player_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Requests for the score store, emitted by the controller and dispatched by the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    SubmitScore { game: GameKind, score: u64, level: u32 },
    SaveGame { level: u32, score: u64, lives: u8 },
    ClearSave,
}

/// Notable things that happened during a tick or an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    LifeLost { lives_left: u8 },
    LevelCleared { level: u32 },
    AuthRequired { pending_level: u32 },
    GameOver { score: u64, level: u32 },
    Victory { score: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_kind_tags_roundtrip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(GameKind::from_tag("Donkey-Kong"), Some(GameKind::DonkeyKong));
        assert_eq!(GameKind::from_tag("pong"), None);
    }

    #[test]
    fn test_game_kind_serializes_as_tag() {
        let json = serde_json::to_string(&GameKind::SpaceInvaders).unwrap();
        assert_eq!(json, "\"space-invaders\"");
    }

    #[test]
    fn test_default_run_state() {
        let run = RunState::default();
        assert_eq!(run.phase, GamePhase::Start);
        assert_eq!(run.level, 1);
        assert_eq!(run.lives, STARTING_LIVES);
        assert_eq!(RunState::fresh().phase, GamePhase::Playing);
    }
}
