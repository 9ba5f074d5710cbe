//! Level and difficulty generation
//!
//! Pure functions from a level number to stage geometry and tuning. Levels
//! are clamped to `1..=MAX_LEVEL` first, and every course table ends in a
//! generic fallback so large course numbers never index past the end.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::{clamp_level, course};

// ============================================================================
// Space shooter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterParams {
    pub rows: usize,
    pub cols: usize,
    /// Formation speed in px/tick
    pub enemy_speed: f32,
    /// Time between enemy shots
    pub fire_interval_ms: f32,
    pub bunkers: usize,
    pub canvas: Vec2,
    /// Sprite variant for the formation (0..10)
    pub sprite_variant: u32,
}

pub fn shooter(level: u32) -> ShooterParams {
    let l = clamp_level(level);
    let band = (l - 1) / 10;
    ShooterParams {
        rows: (3 + (l - 1) / 5).min(6) as usize,
        cols: (6 + (l - 1) / 3).min(12) as usize,
        enemy_speed: 1.0 + l as f32 * 0.1,
        fire_interval_ms: 2000u32.saturating_sub(50 * l).max(500) as f32,
        bunkers: 4u32.saturating_sub(band) as usize,
        canvas: Vec2::new(800.0 + 100.0 * band as f32, 600.0),
        sprite_variant: (l - 1) % 10,
    }
}

// ============================================================================
// Block stacking
// ============================================================================

/// Base points for clearing 0..=4 rows at once
pub const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];
pub const LINES_PER_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackParams {
    pub cols: usize,
    pub rows: usize,
    /// Gravity interval
    pub drop_interval_ms: u32,
}

pub fn stacking(level: u32) -> StackParams {
    let l = clamp_level(level);
    StackParams {
        cols: 10 + 2 * ((l - 1) / 10) as usize,
        rows: 20,
        drop_interval_ms: 1000u32.saturating_sub(100 * (l - 1)).max(100),
    }
}

/// Points for clearing `rows` rows at `level`
pub fn line_points(rows: usize, level: u32) -> u64 {
    LINE_POINTS[rows.min(LINE_POINTS.len() - 1)] * level as u64
}

/// Level reached after `lines` total cleared rows
pub fn stacking_level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

// ============================================================================
// Maze chase
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazeParams {
    pub ghosts: usize,
    /// Tiles/tick before per-ghost jitter
    pub ghost_speed: f32,
    /// Index into `mazes::MAZES`
    pub maze: usize,
}

/// Upper bound on per-ghost speed jitter
pub const GHOST_SPEED_JITTER: f32 = 0.01;

pub fn maze(level: u32) -> MazeParams {
    let l = clamp_level(level);
    MazeParams {
        ghosts: (4 + (l - 1) / 2).min(10) as usize,
        ghost_speed: 0.05 + 0.002 * (l - 1) as f32,
        maze: (course(l) as usize - 1).min(super::mazes::MAZES.len() - 1),
    }
}

// ============================================================================
// Platform climber
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimberCourse {
    Classic,
    Factory,
    /// Generic zig-zag used for every course past the second
    Summit,
}

impl ClimberCourse {
    pub fn for_level(level: u32) -> Self {
        match course(level) {
            1 => ClimberCourse::Classic,
            2 => ClimberCourse::Factory,
            _ => ClimberCourse::Summit,
        }
    }
}

/// Static geometry for one climber stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimberStage {
    pub course: ClimberCourse,
    pub floors: Vec<Aabb>,
    pub ladders: Vec<Aabb>,
    /// Top platform; standing on it completes the level
    pub goal: Aabb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimberParams {
    pub barrel_speed: f32,
    /// Ticks between barrel spawns
    pub spawn_interval: u32,
    pub stage: ClimberStage,
}

const GIRDER: f32 = 20.0;
const LADDER_W: f32 = 20.0;

fn girder(x: f32, y: f32, w: f32) -> Aabb {
    Aabb::new(x, y, w, GIRDER)
}

fn ladder(x: f32, y: f32, h: f32) -> Aabb {
    Aabb::new(x, y, LADDER_W, h)
}

pub fn climber(level: u32) -> ClimberParams {
    let l = clamp_level(level);
    let course = ClimberCourse::for_level(l);
    let ground = Aabb::new(0.0, 480.0, 600.0, GIRDER);

    let (mut floors, ladders, goal) = match course {
        ClimberCourse::Classic => (
            vec![
                ground,
                girder(0.0, 380.0, 500.0),
                girder(100.0, 280.0, 500.0),
                girder(0.0, 180.0, 500.0),
                girder(50.0, 100.0, 300.0),
            ],
            vec![
                ladder(450.0, 380.0, 100.0),
                ladder(120.0, 280.0, 100.0),
                ladder(470.0, 180.0, 100.0),
                ladder(130.0, 100.0, 80.0),
                ladder(240.0, 40.0, 60.0),
            ],
            Aabb::new(200.0, 40.0, 100.0, 10.0),
        ),
        ClimberCourse::Factory => (
            vec![
                ground,
                girder(0.0, 380.0, 250.0),
                girder(350.0, 380.0, 250.0),
                girder(100.0, 280.0, 400.0),
                girder(0.0, 180.0, 200.0),
                girder(300.0, 180.0, 300.0),
                girder(150.0, 80.0, 300.0),
            ],
            vec![
                ladder(280.0, 380.0, 100.0),
                ladder(50.0, 280.0, 100.0),
                ladder(450.0, 180.0, 100.0),
                ladder(200.0, 80.0, 100.0),
                ladder(290.0, 30.0, 50.0),
            ],
            Aabb::new(250.0, 30.0, 100.0, 10.0),
        ),
        ClimberCourse::Summit => {
            let mut floors = vec![ground];
            let mut ladders = Vec::new();
            for i in 0..4 {
                let y = 380.0 - 100.0 * i as f32;
                let even = i % 2 == 0;
                floors.push(girder(if even { 0.0 } else { 100.0 }, y, 500.0));
                ladders.push(ladder(if even { 550.0 } else { 50.0 }, y, 100.0));
            }
            ladders.push(ladder(290.0, 30.0, 50.0));
            (floors, ladders, Aabb::new(250.0, 30.0, 100.0, 10.0))
        }
    };
    floors.push(goal);

    ClimberParams {
        barrel_speed: 2.0 + 0.1 * l as f32,
        spawn_interval: 180u32.saturating_sub(3 * l).max(60),
        stage: ClimberStage {
            course,
            floors,
            ladders,
            goal,
        },
    }
}

// ============================================================================
// Lane crossing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKind {
    Home,
    River,
    Safe,
    Road,
}

/// What moves along a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneObjectKind {
    Log,
    Turtle,
    Car,
    Truck,
}

impl LaneObjectKind {
    pub fn width(&self) -> f32 {
        match self {
            LaneObjectKind::Log | LaneObjectKind::Truck => 80.0,
            LaneObjectKind::Turtle | LaneObjectKind::Car => 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneDef {
    pub kind: LaneKind,
    /// Signed px/tick; positive moves right
    pub speed: f32,
    pub object: Option<LaneObjectKind>,
}

impl LaneDef {
    const fn still(kind: LaneKind) -> Self {
        Self {
            kind,
            speed: 0.0,
            object: None,
        }
    }

    fn moving(kind: LaneKind, speed: f32, object: LaneObjectKind) -> Self {
        Self {
            kind,
            speed,
            object: Some(object),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingParams {
    pub speed_mult: f32,
    /// Highway lanes for every course past the first
    pub highway: bool,
    /// One lane per row, top (home) to bottom (start)
    pub lanes: Vec<LaneDef>,
}

pub fn crossing(level: u32) -> CrossingParams {
    use LaneKind::*;
    use LaneObjectKind::*;

    let l = clamp_level(level);
    let m = 1.0 + 0.1 * l as f32;
    let highway = course(l) > 1;

    let river: [(f32, LaneObjectKind); 5] = if highway {
        [(2.0, Turtle), (-2.5, Log), (3.0, Turtle), (-2.0, Log), (2.0, Turtle)]
    } else {
        [(1.5, Log), (-2.0, Turtle), (2.5, Log), (-1.5, Turtle), (1.0, Log)]
    };
    let road: [(f32, LaneObjectKind); 5] = if highway {
        [(-3.0, Car), (3.0, Car), (-2.5, Truck), (2.5, Car), (-2.0, Truck)]
    } else {
        [(-1.5, Truck), (2.0, Car), (-1.0, Car), (1.5, Car), (-2.0, Truck)]
    };

    let mut lanes = Vec::with_capacity(13);
    lanes.push(LaneDef::still(Home));
    lanes.extend(river.iter().map(|&(s, o)| LaneDef::moving(River, s * m, o)));
    lanes.push(LaneDef::still(Safe));
    lanes.extend(road.iter().map(|&(s, o)| LaneDef::moving(Road, s * m, o)));
    lanes.push(LaneDef::still(Safe));

    CrossingParams {
        speed_mult: m,
        highway,
        lanes,
    }
}

// ============================================================================
// Lane driving
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrivingParams {
    /// Road scroll speed in px/tick before boost
    pub base_speed: f32,
    /// Per-tick obstacle spawn probability
    pub obstacle_chance: f64,
}

pub fn driving(level: u32) -> DrivingParams {
    let l = clamp_level(level);
    DrivingParams {
        base_speed: 5.0 + 0.5 * l as f32,
        obstacle_chance: 0.02 + 0.01 * ((l - 1) / 10) as f64,
    }
}
