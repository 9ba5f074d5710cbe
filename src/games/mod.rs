//! The six cabinet games
//!
//! Each module owns its entity model (closed enums per entity kind) and the
//! tick rules behind `sim::Game`. Run state, lives and level changes stay in
//! the controller.

pub mod blocks;
pub mod climber;
pub mod frogger;
pub mod invaders;
pub mod maze;
pub mod racing;

pub use blocks::Blocks;
pub use climber::Climber;
pub use frogger::Frogger;
pub use invaders::Invaders;
pub use maze::Maze;
pub use racing::Racing;
