//! Simulation core
//!
//! Shared by every game:
//! - Fixed timestep only
//! - Seeded RNG only (one `Pcg32` per run)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod mazes;
pub mod state;
pub mod tick;

pub use collision::{Aabb, clamp_to_canvas, tile_index, within_reach, wrap_lane_x};
pub use mazes::{MazeLayout, Tile};
pub use state::{GameEvent, GameKind, GamePhase, Identity, RunState, StoreCommand};
pub use tick::{Controller, Game, Outcome, Step};
