//! Lane driving
//!
//! The road scrolls toward the car; obstacles drop into one of three lanes.
//! Any contact ends the run. Ten dodges or one minute on the road clears the
//! level.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::platform::{Action, HeldActions, InputEvent};
use crate::sim::collision::Aabb;
use crate::sim::level::{self, DrivingParams};
use crate::sim::{Game, GameKind, Outcome, Step};

pub const CANVAS: Vec2 = Vec2::new(400.0, 600.0);
pub const LANES: usize = 3;
pub const LANE_WIDTH: f32 = CANVAS.x / LANES as f32;
pub const CAR_SIZE: Vec2 = Vec2::new(40.0, 70.0);
const START: Vec2 = Vec2::new(180.0, 500.0);
const STEER_SPEED: f32 = 5.0;
const BOOST: f32 = 1.5;

pub const OBSTACLE_SIZE: f32 = 40.0;
pub const DODGES_PER_LEVEL: u32 = 10;
/// Seconds on the road that also clear a level
pub const TIME_LIMIT: u32 = 60;
/// Period of the dashed lane markings
pub const DASH_PERIOD: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Barrier,
    Oil,
}

impl ObstacleKind {
    fn from_roll(roll: f32) -> Self {
        if roll > 0.9 {
            ObstacleKind::Oil
        } else if roll > 0.6 {
            ObstacleKind::Barrier
        } else {
            ObstacleKind::Rock
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub bounds: Aabb,
    /// Already counted as dodged
    pub passed: bool,
}

impl Obstacle {
    pub fn in_lane(kind: ObstacleKind, lane: usize, y: f32) -> Self {
        let x = lane as f32 * LANE_WIDTH + (LANE_WIDTH - OBSTACLE_SIZE) / 2.0;
        Self {
            kind,
            bounds: Aabb::new(x, y, OBSTACLE_SIZE, OBSTACLE_SIZE),
            passed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Racing {
    pub params: DrivingParams,
    /// Top-left of the car
    pub car: Vec2,
    pub obstacles: Vec<Obstacle>,
    pub dodged: u32,
    /// Ticks driven this level
    pub ticks: u32,
    /// Current speed in px/tick, boost included
    pub speed: f32,
    /// Offset of the lane markings, for drawing
    pub scroll: f32,
    #[serde(skip)]
    held: HeldActions,
}

impl Default for Racing {
    fn default() -> Self {
        let params = level::driving(1);
        Self {
            params,
            car: START,
            obstacles: Vec::new(),
            dodged: 0,
            ticks: 0,
            speed: params.base_speed,
            scroll: 0.0,
            held: HeldActions::default(),
        }
    }
}

impl Racing {
    pub fn car_bounds(&self) -> Aabb {
        Aabb::from_pos(self.car, CAR_SIZE)
    }

    pub fn seconds(&self) -> u32 {
        self.ticks / TICKS_PER_SECOND
    }

    fn drive(&mut self) {
        self.speed = self.params.base_speed;
        if self.held.is_held(Action::A) {
            self.speed *= BOOST;
        }
        self.car.x = (self.car.x + self.held.horizontal() * STEER_SPEED)
            .clamp(0.0, CANVAS.x - CAR_SIZE.x);
        self.scroll = (self.scroll + self.speed) % DASH_PERIOD;
    }

    fn maybe_spawn(&mut self, rng: &mut Pcg32) {
        if !rng.random_bool(self.params.obstacle_chance) {
            return;
        }
        let lane = rng.random_range(0..LANES);
        let kind = ObstacleKind::from_roll(rng.random::<f32>());
        self.obstacles.push(Obstacle::in_lane(kind, lane, 0.0));
    }

    /// Move obstacles; returns true on a crash
    fn scroll_obstacles(&mut self) -> bool {
        let car = self.car_bounds();
        for obs in &mut self.obstacles {
            obs.bounds.y += self.speed;
            if obs.bounds.overlaps(&car) {
                return true;
            }
            if !obs.passed && obs.bounds.y > car.bottom() {
                obs.passed = true;
                self.dodged += 1;
            }
        }
        self.obstacles.retain(|o| o.bounds.y <= CANVAS.y);
        false
    }
}

impl Game for Racing {
    const KIND: GameKind = GameKind::Racing;

    fn enter_level(&mut self, level: u32, _rng: &mut Pcg32) {
        self.params = level::driving(level);
        log::debug!(
            "racing level {}: {:.1}px/tick, obstacle chance {:.2}",
            level,
            self.params.base_speed,
            self.params.obstacle_chance
        );
        self.car = START;
        self.obstacles.clear();
        self.dodged = 0;
        self.ticks = 0;
        self.speed = self.params.base_speed;
        self.held.clear();
    }

    fn reset_life(&mut self, level: u32, rng: &mut Pcg32) {
        self.enter_level(level, rng);
    }

    fn input(&mut self, event: InputEvent) {
        self.held.apply(event);
    }

    fn step(&mut self, _level: u32, rng: &mut Pcg32) -> Step {
        self.ticks += 1;
        self.drive();
        let step = Step::points((self.speed / 10.0).round() as u64);

        if self.dodged >= DODGES_PER_LEVEL || self.ticks >= TIME_LIMIT * TICKS_PER_SECOND {
            return step.with(Outcome::LevelComplete { bonus: 0 });
        }

        self.maybe_spawn(rng);
        if self.scroll_obstacles() {
            return step.with(Outcome::Fatal);
        }
        step
    }

    fn canvas_size(&self) -> Vec2 {
        CANVAS
    }

    fn player_bounds(&self) -> Aabb {
        self.car_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn quiet() -> (Racing, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut game = Racing::default();
        game.enter_level(1, &mut rng);
        game.params.obstacle_chance = 0.0;
        (game, rng)
    }

    #[test]
    fn test_points_follow_speed() {
        let (mut game, mut rng) = quiet();
        // 5.5 px/tick rounds to 1
        assert_eq!(game.step(1, &mut rng).points, 1);
        game.params.base_speed = 30.0;
        game.input(InputEvent::press(Action::A));
        // Boosted to 45
        assert_eq!(game.step(1, &mut rng).points, 5);
        assert_eq!(game.speed, 45.0);
    }

    #[test]
    fn test_obstacle_contact_is_fatal() {
        let (mut game, mut rng) = quiet();
        // Middle lane, just above the car
        let mut obs = Obstacle::in_lane(ObstacleKind::Rock, 1, 0.0);
        obs.bounds.y = START.y - OBSTACLE_SIZE;
        game.obstacles.push(obs);
        assert_eq!(game.step(1, &mut rng).outcome, Some(Outcome::Fatal));
    }

    #[test]
    fn test_other_lane_is_dodged() {
        let (mut game, mut rng) = quiet();
        game.obstacles.push(Obstacle::in_lane(ObstacleKind::Oil, 0, 0.0));
        for _ in 0..200 {
            assert_eq!(game.step(1, &mut rng).outcome, None);
        }
        assert_eq!(game.dodged, 1);
        assert!(game.obstacles.is_empty());
    }

    #[test]
    fn test_ten_dodges_clear_level() {
        let (mut game, mut rng) = quiet();
        game.dodged = DODGES_PER_LEVEL;
        assert_eq!(
            game.step(1, &mut rng).outcome,
            Some(Outcome::LevelComplete { bonus: 0 })
        );
    }

    #[test]
    fn test_one_minute_clears_level() {
        let (mut game, mut rng) = quiet();
        let mut outcome = None;
        let mut ticks = 0;
        while outcome.is_none() {
            outcome = game.step(1, &mut rng).outcome;
            ticks += 1;
        }
        assert_eq!(ticks, TIME_LIMIT * TICKS_PER_SECOND);
        assert_eq!(outcome, Some(Outcome::LevelComplete { bonus: 0 }));
    }

    #[test]
    fn test_steering_clamps() {
        let (mut game, mut rng) = quiet();
        game.input(InputEvent::press(Action::Right));
        for _ in 0..100 {
            game.step(1, &mut rng);
        }
        assert_eq!(game.car.x, CANVAS.x - CAR_SIZE.x);
    }

    #[test]
    fn test_spawns_are_lane_centered() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut game = Racing::default();
        game.enter_level(1, &mut rng);
        game.params.obstacle_chance = 1.0;
        game.maybe_spawn(&mut rng);
        game.maybe_spawn(&mut rng);
        assert_eq!(game.obstacles.len(), 2);
        for obs in &game.obstacles {
            let lane = (obs.bounds.center().x / LANE_WIDTH).floor();
            let lane_center = lane * LANE_WIDTH + LANE_WIDTH / 2.0;
            assert!((obs.bounds.center().x - lane_center).abs() < 1e-3);
            assert_eq!(obs.bounds.y, 0.0);
        }
    }

    #[test]
    fn test_obstacle_kind_rolls() {
        assert_eq!(ObstacleKind::from_roll(0.1), ObstacleKind::Rock);
        assert_eq!(ObstacleKind::from_roll(0.7), ObstacleKind::Barrier);
        assert_eq!(ObstacleKind::from_roll(0.95), ObstacleKind::Oil);
    }
}
