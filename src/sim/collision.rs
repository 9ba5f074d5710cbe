//! Collision detection helpers shared by the games
//!
//! Everything here is discrete: callers pass post-integration positions and
//! fast movers can tunnel through thin geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in canvas space (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap test; touching edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.y < other.bottom() && self.bottom() > other.y
    }

    /// Horizontal-only overlap
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x > self.x && x < self.right()
    }
}

/// Check if two points are closer than `reach`
#[inline]
pub fn within_reach(a: Vec2, b: Vec2, reach: f32) -> bool {
    a.distance_squared(b) < reach * reach
}

/// Clamp a top-left position so a box of `size` stays on the canvas.
/// Returns true if the position was changed.
pub fn clamp_to_canvas(pos: &mut Vec2, size: Vec2, canvas: Vec2) -> bool {
    let max = (canvas - size).max(Vec2::ZERO);
    let clamped = pos.clamp(Vec2::ZERO, max);
    let changed = clamped != *pos;
    *pos = clamped;
    changed
}

/// Convert a continuous position into a (col, row) tile index.
/// Returns None outside the grid so callers never index out of bounds.
pub fn tile_index(x: f32, y: f32, cols: usize, rows: usize) -> Option<(usize, usize)> {
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let (col, row) = (x.floor() as usize, y.floor() as usize);
    (col < cols && row < rows).then_some((col, row))
}

/// Wrap a horizontally scrolling object once it has fully left the canvas
pub fn wrap_lane_x(x: f32, width: f32, speed: f32, canvas_width: f32) -> f32 {
    if speed > 0.0 && x > canvas_width {
        -width
    } else if speed < 0.0 && x < -width {
        canvas_width
    } else {
        x
    }
}
