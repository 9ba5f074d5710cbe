//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input actions (device events mapped to an abstract vocabulary)
//! - Frame scheduling (one cancellable pending tick)
//! - Wall-clock time for record timestamps

pub mod clock;
pub mod input;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use input::{Action, HeldActions, InputEvent};
pub use scheduler::{FrameScheduler, TickHandle};
