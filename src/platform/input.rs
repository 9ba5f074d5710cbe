//! Abstract input actions
//!
//! Devices (keyboard, touch buttons) report press/release of these actions;
//! games never see raw key codes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Primary: jump / shoot / boost / rotate depending on the game
    A,
    /// Secondary: hard drop and menu confirm
    B,
}

impl Action {
    pub const DIRECTIONS: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn is_direction(&self) -> bool {
        !matches!(self, Action::A | Action::B)
    }

    /// Unit step in tile space (y down)
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::A | Action::B => (0, 0),
        }
    }

    pub fn opposite(&self) -> Action {
        match self {
            Action::Up => Action::Down,
            Action::Down => Action::Up,
            Action::Left => Action::Right,
            Action::Right => Action::Left,
            other => *other,
        }
    }

    /// Map a DOM `KeyboardEvent.code` to an action
    pub fn from_key_code(code: &str) -> Option<Action> {
        match code {
            "ArrowUp" | "KeyW" => Some(Action::Up),
            "ArrowDown" | "KeyS" => Some(Action::Down),
            "ArrowLeft" | "KeyA" => Some(Action::Left),
            "ArrowRight" | "KeyD" => Some(Action::Right),
            "Space" => Some(Action::A),
            "Enter" | "KeyX" => Some(Action::B),
            _ => None,
        }
    }
}

/// One press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub action: Action,
    pub active: bool,
}

impl InputEvent {
    pub fn press(action: Action) -> Self {
        Self {
            action,
            active: true,
        }
    }

    pub fn release(action: Action) -> Self {
        Self {
            action,
            active: false,
        }
    }
}

/// Currently held actions in press order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldActions {
    order: Vec<Action>,
}

impl HeldActions {
    pub fn apply(&mut self, event: InputEvent) {
        self.order.retain(|a| *a != event.action);
        if event.active {
            self.order.push(event.action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.order.contains(&action)
    }

    /// Most recently pressed direction still held
    pub fn latest_direction(&self) -> Option<Action> {
        self.order.iter().rev().copied().find(Action::is_direction)
    }

    /// -1, 0 or 1; the later of left/right wins when both are held
    pub fn horizontal(&self) -> f32 {
        match self
            .order
            .iter()
            .rev()
            .find(|a| matches!(a, Action::Left | Action::Right))
        {
            Some(Action::Left) => -1.0,
            Some(Action::Right) => 1.0,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
