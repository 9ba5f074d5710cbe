//! Platform climber
//!
//! Climb girders and ladders to the goal platform while barrels roll down
//! from the top. Floors resolve before ladders; a player latched onto a
//! ladder drops through every girder above the ladder's foot.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::platform::{Action, HeldActions, InputEvent};
use crate::sim::collision::{Aabb, within_reach};
use crate::sim::level::{self, ClimberParams};
use crate::sim::{Game, GameKind, Outcome, Step};

pub const CANVAS: Vec2 = Vec2::new(600.0, 500.0);
pub const PLAYER_SIZE: Vec2 = Vec2::new(20.0, 30.0);
const START: Vec2 = Vec2::new(50.0, 450.0);

const GRAVITY: f32 = 0.4;
const JUMP_VELOCITY: f32 = -8.0;
const WALK_SPEED: f32 = 3.0;
const CLIMB_SPEED: f32 = 2.0;
/// Extra reach below a ladder's foot that still counts as touching it
const LADDER_FOOT: f32 = 10.0;

pub const BARREL_RADIUS: f32 = 10.0;
const BARREL_SPAWN: Vec2 = Vec2::new(100.0, 80.0);
pub const MAX_BARRELS: usize = 24;

pub const SURVIVAL_POINTS: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Jumper {
    /// Top-left
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    /// Index of the ladder being climbed
    pub ladder: Option<usize>,
}

impl Jumper {
    fn bounds(&self) -> Aabb {
        Aabb::from_pos(self.pos, PLAYER_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barrel {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Climber {
    pub params: ClimberParams,
    pub player: Jumper,
    pub barrels: Vec<Barrel>,
    spawn_timer: u32,
    elapsed: u32,
    #[serde(skip)]
    held: HeldActions,
}

impl Default for Climber {
    fn default() -> Self {
        Self {
            params: level::climber(1),
            player: Jumper {
                pos: START,
                ..Default::default()
            },
            barrels: Vec::new(),
            spawn_timer: 0,
            elapsed: 0,
            held: HeldActions::default(),
        }
    }
}

impl Climber {
    fn apply_intents(&mut self) {
        let p = &mut self.player;
        p.vel.x = self.held.horizontal() * WALK_SPEED;
        if p.grounded && self.held.is_held(Action::A) {
            p.vel.y = JUMP_VELOCITY;
            p.grounded = false;
        }
        if p.ladder.is_none() {
            p.vel.y += GRAVITY;
        }
        p.pos += p.vel;
        p.grounded = false;
    }

    fn land_on_floors(&mut self) {
        let stage = &self.params.stage;
        let p = &mut self.player;
        // Girders above the latched ladder's foot are passed through
        let floor_line = p.ladder.and_then(|i| stage.ladders.get(i)).map(Aabb::bottom);

        for floor in &stage.floors {
            if floor_line.is_some_and(|line| floor.y < line) {
                continue;
            }
            let body = p.bounds();
            let bottom = body.bottom();
            if p.vel.y >= 0.0
                && bottom >= floor.y
                && bottom <= floor.bottom()
                && body.overlaps_x(floor)
            {
                p.pos.y = floor.y - PLAYER_SIZE.y;
                p.vel.y = 0.0;
                p.grounded = true;
                p.ladder = None;
            }
        }
    }

    fn use_ladders(&mut self) {
        let body = self.player.bounds();
        let touching = self.params.stage.ladders.iter().position(|l| {
            body.overlaps_x(l) && body.bottom() >= l.y && body.y < l.bottom() + LADDER_FOOT
        });

        let p = &mut self.player;
        let Some(index) = touching else {
            p.ladder = None;
            return;
        };
        if self.held.is_held(Action::Up) {
            p.ladder = Some(index);
            p.vel.y = -CLIMB_SPEED;
        } else if self.held.is_held(Action::Down) {
            p.ladder = Some(index);
            p.vel.y = CLIMB_SPEED;
        } else if p.ladder.is_some() {
            p.vel.y = 0.0;
        }
    }

    /// Dropping past the bottom edge with no girder underneath
    fn fell_off(&self) -> bool {
        self.player.pos.y + PLAYER_SIZE.y > CANVAS.y
    }

    fn clamp_player(&mut self) {
        let p = &mut self.player;
        p.pos.x = p.pos.x.clamp(0.0, CANVAS.x - PLAYER_SIZE.x);
        if p.pos.y < 0.0 {
            p.pos.y = 0.0;
            p.vel.y = p.vel.y.max(0.0);
        }
        p.pos.y = p.pos.y.min(CANVAS.y - PLAYER_SIZE.y);
    }

    fn on_goal(&self) -> bool {
        let goal = self.params.stage.goal;
        let body = self.player.bounds();
        body.bottom() <= goal.y && body.x > goal.x && body.x < goal.right()
    }

    fn roll_barrels(&mut self) {
        self.spawn_timer += 1;
        if self.spawn_timer > self.params.spawn_interval && self.barrels.len() < MAX_BARRELS {
            self.spawn_timer = 0;
            self.barrels.push(Barrel {
                pos: BARREL_SPAWN,
                vel: Vec2::new(self.params.barrel_speed, 0.0),
            });
        }

        let floors = &self.params.stage.floors;
        for barrel in &mut self.barrels {
            barrel.vel.y += GRAVITY;
            barrel.pos += barrel.vel;

            for floor in floors {
                let bottom = barrel.pos.y + BARREL_RADIUS;
                if barrel.vel.y >= 0.0
                    && bottom >= floor.y
                    && bottom <= floor.bottom()
                    && floor.contains_x(barrel.pos.x)
                {
                    barrel.pos.y = floor.y - BARREL_RADIUS;
                    barrel.vel.y = 0.0;
                }
            }

            if barrel.pos.x - BARREL_RADIUS < 0.0 || barrel.pos.x + BARREL_RADIUS > CANVAS.x {
                barrel.vel.x = -barrel.vel.x;
                barrel.pos.x = barrel.pos.x.clamp(BARREL_RADIUS, CANVAS.x - BARREL_RADIUS);
            }
        }
        self.barrels.retain(|b| b.pos.y <= CANVAS.y);
    }

    fn hit_by_barrel(&self) -> bool {
        let center = self.player.bounds().center();
        self.barrels
            .iter()
            .any(|b| within_reach(b.pos, center, BARREL_RADIUS + PLAYER_SIZE.x / 2.0))
    }
}

impl Game for Climber {
    const KIND: GameKind = GameKind::DonkeyKong;

    fn enter_level(&mut self, level: u32, _rng: &mut Pcg32) {
        self.params = level::climber(level);
        log::debug!(
            "climber level {}: {:?} course, barrels {:.1}px/tick every {} ticks",
            level,
            self.params.stage.course,
            self.params.barrel_speed,
            self.params.spawn_interval
        );
        self.player = Jumper {
            pos: START,
            ..Default::default()
        };
        self.barrels.clear();
        self.spawn_timer = 0;
        self.elapsed = 0;
        self.held.clear();
    }

    fn reset_life(&mut self, level: u32, rng: &mut Pcg32) {
        self.enter_level(level, rng);
    }

    fn input(&mut self, event: InputEvent) {
        self.held.apply(event);
    }

    fn step(&mut self, _level: u32, _rng: &mut Pcg32) -> Step {
        self.apply_intents();
        self.land_on_floors();
        self.use_ladders();

        if self.fell_off() {
            return Step::default().with(Outcome::LifeLost);
        }
        self.clamp_player();
        if self.on_goal() {
            return Step::default().with(Outcome::LevelComplete { bonus: 0 });
        }

        self.roll_barrels();
        if self.hit_by_barrel() {
            return Step::default().with(Outcome::LifeLost);
        }

        self.elapsed += 1;
        if self.elapsed % TICKS_PER_SECOND == 0 {
            Step::points(SURVIVAL_POINTS)
        } else {
            Step::default()
        }
    }

    fn canvas_size(&self) -> Vec2 {
        CANVAS
    }

    fn player_bounds(&self) -> Aabb {
        self.player.bounds()
    }
}
