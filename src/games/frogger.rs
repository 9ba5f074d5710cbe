//! Lane crossing
//!
//! The frog hops one tile per press. Road lanes kill on horizontal overlap;
//! river lanes kill unless the frog's center sits over a log or turtle, in
//! which case it rides along at the lane speed. Reaching the top row fills a
//! home slot; the fifth arrival clears the level.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::platform::InputEvent;
use crate::sim::collision::{Aabb, clamp_to_canvas, tile_index, wrap_lane_x};
use crate::sim::level::{self, LaneDef, LaneKind, LaneObjectKind};
use crate::sim::{Game, GameKind, Outcome, Step};

pub const GRID: f32 = 40.0;
pub const COLS: usize = 15;
pub const ROWS: usize = 13;
pub const CANVAS: Vec2 = Vec2::new(COLS as f32 * GRID, ROWS as f32 * GRID);

pub const HOME_SLOTS: usize = 5;
pub const HOME_POINTS: u64 = 50;
pub const LEVEL_BONUS: u64 = 1000;
/// Seconds allowed per life
pub const TIME_LIMIT: u32 = 60;

const START: Vec2 = Vec2::new(7.0 * GRID, 12.0 * GRID);

/// Log, turtle or vehicle moving along a lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneObject {
    pub kind: LaneObjectKind,
    pub x: f32,
    pub width: f32,
}

impl LaneObject {
    pub fn new(kind: LaneObjectKind, x: f32) -> Self {
        Self {
            kind,
            x,
            width: kind.width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub def: LaneDef,
    pub objects: Vec<LaneObject>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrogState {
    #[default]
    Idle,
    Riding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frogger {
    /// Top-left of the frog
    pub frog: Vec2,
    pub state: FrogState,
    /// One lane per row, top to bottom
    pub lanes: Vec<Lane>,
    pub homes: [bool; HOME_SLOTS],
    pub ticks_left: u32,
}

impl Frogger {
    pub fn frog_bounds(&self) -> Aabb {
        Aabb::from_pos(self.frog, Vec2::splat(GRID))
    }

    /// Whole seconds left on the countdown
    pub fn seconds_left(&self) -> u32 {
        self.ticks_left.div_ceil(TICKS_PER_SECOND)
    }

    fn reset_frog(&mut self) {
        self.frog = START;
        self.state = FrogState::Idle;
        self.ticks_left = TIME_LIMIT * TICKS_PER_SECOND;
    }

    fn move_lanes(&mut self) {
        for lane in &mut self.lanes {
            let speed = lane.def.speed;
            for obj in &mut lane.objects {
                obj.x = wrap_lane_x(obj.x + speed, obj.width, speed, CANVAS.x);
            }
        }
    }

    fn current_row(&self) -> Option<usize> {
        tile_index(self.frog.x / GRID, self.frog.y / GRID, COLS, ROWS).map(|(_, row)| row)
    }

    fn reach_home(&mut self) -> Step {
        self.reset_frog();
        let filled = self.homes.iter().filter(|h| **h).count();
        if filled < HOME_SLOTS - 1 {
            self.homes[filled] = true;
            Step::points(HOME_POINTS)
        } else {
            self.homes = [true; HOME_SLOTS];
            Step::points(HOME_POINTS).with(Outcome::LevelComplete { bonus: LEVEL_BONUS })
        }
    }
}

impl Game for Frogger {
    const KIND: GameKind = GameKind::Frogger;

    fn enter_level(&mut self, level: u32, rng: &mut Pcg32) {
        let params = level::crossing(level);
        log::debug!(
            "frogger level {}: speed x{:.1}, highway={}",
            level,
            params.speed_mult,
            params.highway
        );

        self.lanes = params
            .lanes
            .into_iter()
            .map(|def| {
                let mut objects = Vec::new();
                if let Some(kind) = def.object.filter(|_| def.speed != 0.0) {
                    let count: usize = rng.random_range(2..=3);
                    let gap = CANVAS.x / count as f32;
                    for i in 0..count {
                        let x = i as f32 * gap + rng.random::<f32>() * 50.0;
                        objects.push(LaneObject::new(kind, x));
                    }
                }
                Lane { def, objects }
            })
            .collect();
        self.homes = [false; HOME_SLOTS];
        self.reset_frog();
    }

    fn reset_life(&mut self, _level: u32, _rng: &mut Pcg32) {
        self.reset_frog();
    }

    fn input(&mut self, event: InputEvent) {
        if !event.active || !event.action.is_direction() {
            return;
        }
        let (dx, dy) = event.action.delta();
        self.frog += Vec2::new(dx as f32, dy as f32) * GRID;
        clamp_to_canvas(&mut self.frog, Vec2::splat(GRID), CANVAS);
    }

    fn step(&mut self, _level: u32, _rng: &mut Pcg32) -> Step {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left == 0 {
            return Step::default().with(Outcome::LifeLost);
        }

        self.move_lanes();

        let Some(lane) = self.current_row().and_then(|row| self.lanes.get(row)) else {
            return Step::default().with(Outcome::LifeLost);
        };

        match lane.def.kind {
            LaneKind::Home => return self.reach_home(),
            LaneKind::Safe => self.state = FrogState::Idle,
            LaneKind::Road => {
                let frog = self.frog_bounds();
                let hit = lane
                    .objects
                    .iter()
                    .any(|obj| frog.overlaps_x(&Aabb::new(obj.x, frog.y, obj.width, GRID)));
                if hit {
                    return Step::default().with(Outcome::LifeLost);
                }
                self.state = FrogState::Idle;
            }
            LaneKind::River => {
                // Any platform under the frog's center point counts as a ride,
                // even if most of the frog hangs over water
                let center = self.frog.x + GRID / 2.0;
                let riding = lane
                    .objects
                    .iter()
                    .any(|obj| center > obj.x && center < obj.x + obj.width);
                if !riding {
                    return Step::default().with(Outcome::LifeLost);
                }
                self.frog.x += lane.def.speed;
                self.state = FrogState::Riding;
            }
        }

        // Carried off the edge
        if self.frog.x < 0.0 || self.frog.x > CANVAS.x - GRID {
            return Step::default().with(Outcome::LifeLost);
        }
        Step::default()
    }

    fn canvas_size(&self) -> Vec2 {
        CANVAS
    }

    fn player_bounds(&self) -> Aabb {
        self.frog_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Action;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    /// Level with frozen lanes: empty roads, one full-width log per river row
    fn calm_board() -> Frogger {
        let mut game = Frogger::default();
        game.enter_level(1, &mut rng());
        for lane in &mut game.lanes {
            lane.def.speed = 0.0;
            lane.objects.clear();
            if lane.def.kind == LaneKind::River {
                lane.objects.push(LaneObject {
                    kind: LaneObjectKind::Log,
                    x: 0.0,
                    width: CANVAS.x,
                });
            }
        }
        game
    }

    fn hop(game: &mut Frogger, action: Action, rng: &mut Pcg32) -> Step {
        game.input(InputEvent::press(action));
        game.step(1, rng)
    }

    #[test]
    fn test_crossing_to_home_awards_once() {
        let mut game = calm_board();
        let mut rng = rng();
        assert_eq!(game.frog, START);

        let mut total = 0;
        for _ in 0..ROWS - 1 {
            let step = hop(&mut game, Action::Up, &mut rng);
            assert_eq!(step.outcome, None);
            total += step.points;
        }
        assert_eq!(total, HOME_POINTS);
        assert_eq!(game.homes, [true, false, false, false, false]);
        assert_eq!(game.frog, START);

        // Sitting on the start row earns nothing more
        for _ in 0..10 {
            assert_eq!(game.step(1, &mut rng), Step::default());
        }
    }

    #[test]
    fn test_fifth_home_completes_level() {
        let mut game = calm_board();
        let mut rng = rng();
        game.homes = [true, true, true, true, false];
        game.frog = Vec2::new(7.0 * GRID, GRID);
        let step = hop(&mut game, Action::Up, &mut rng);
        assert_eq!(step.points, HOME_POINTS);
        assert_eq!(
            step.outcome,
            Some(Outcome::LevelComplete { bonus: LEVEL_BONUS })
        );
    }

    #[test]
    fn test_car_overlap_kills() {
        let mut game = calm_board();
        let mut rng = rng();
        // Row 11 is the first road lane above the start row
        game.lanes[11].objects.push(LaneObject::new(LaneObjectKind::Car, START.x + 20.0));
        let step = hop(&mut game, Action::Up, &mut rng);
        assert_eq!(step.outcome, Some(Outcome::LifeLost));
    }

    #[test]
    fn test_touching_car_edge_is_safe() {
        let mut game = calm_board();
        let mut rng = rng();
        game.lanes[11].objects.push(LaneObject::new(LaneObjectKind::Car, START.x + GRID));
        assert_eq!(hop(&mut game, Action::Up, &mut rng).outcome, None);
    }

    #[test]
    fn test_open_water_drowns() {
        let mut game = calm_board();
        let mut rng = rng();
        game.lanes[5].objects.clear();
        game.frog = Vec2::new(7.0 * GRID, 6.0 * GRID);
        assert_eq!(hop(&mut game, Action::Up, &mut rng).outcome, Some(Outcome::LifeLost));
    }

    #[test]
    fn test_lenient_center_ride() {
        let mut game = calm_board();
        let mut rng = rng();
        // After this tick's move the log starts one pixel left of the frog's center
        game.lanes[5].def.speed = 1.0;
        game.lanes[5].objects = vec![LaneObject {
            kind: LaneObjectKind::Log,
            x: 7.0 * GRID + GRID / 2.0 - 2.0,
            width: 80.0,
        }];
        game.frog = Vec2::new(7.0 * GRID, 6.0 * GRID);
        let step = hop(&mut game, Action::Up, &mut rng);
        assert_eq!(step.outcome, None);
        assert_eq!(game.state, FrogState::Riding);
        assert_eq!(game.frog.x, 7.0 * GRID + 1.0);
    }

    #[test]
    fn test_carried_off_edge_dies() {
        let mut game = calm_board();
        let mut rng = rng();
        game.lanes[5].def.speed = 5.0;
        game.frog = Vec2::new(CANVAS.x - GRID, 5.0 * GRID);
        assert_eq!(game.step(1, &mut rng).outcome, Some(Outcome::LifeLost));
    }

    #[test]
    fn test_timer_expiry_costs_life() {
        let mut game = calm_board();
        let mut rng = rng();
        assert_eq!(game.seconds_left(), TIME_LIMIT);
        game.ticks_left = 1;
        assert_eq!(game.step(1, &mut rng).outcome, Some(Outcome::LifeLost));
        game.reset_life(1, &mut rng);
        assert_eq!(game.seconds_left(), TIME_LIMIT);
    }

    #[test]
    fn test_hops_clamp_to_canvas() {
        let mut game = calm_board();
        game.input(InputEvent::press(Action::Down));
        assert_eq!(game.frog, START);
        for _ in 0..20 {
            game.input(InputEvent::press(Action::Left));
        }
        assert_eq!(game.frog.x, 0.0);
        // Releases never move the frog
        game.input(InputEvent::release(Action::Right));
        assert_eq!(game.frog.x, 0.0);
    }

    #[test]
    fn test_lane_objects_stay_near_canvas() {
        let mut game = Frogger::default();
        let mut rng = rng();
        game.enter_level(30, &mut rng);
        for lane in &game.lanes[1..12] {
            if lane.def.kind != LaneKind::Safe {
                assert!((2..=3).contains(&lane.objects.len()));
            }
        }
        for _ in 0..2000 {
            game.move_lanes();
            for obj in game.lanes.iter().flat_map(|l| &l.objects) {
                assert!(obj.x >= -obj.width && obj.x <= CANVAS.x);
            }
        }
    }
}
