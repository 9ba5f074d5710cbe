//! Space shooter
//!
//! A formation sweeps side to side, dropping a row each time it touches a
//! wall, while the player slides along the bottom. Bunkers soak up shots
//! from both sides until they crumble.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::platform::{Action, HeldActions, InputEvent};
use crate::sim::collision::Aabb;
use crate::sim::level::{self, ShooterParams};
use crate::sim::{Game, GameKind, Outcome, Step};

pub const PLAYER_SIZE: Vec2 = Vec2::new(50.0, 30.0);
pub const PLAYER_SPEED: f32 = 5.0;
pub const ENEMY_SIZE: Vec2 = Vec2::new(40.0, 30.0);
const ENEMY_GAP: f32 = 20.0;
const FORMATION_TOP: f32 = 50.0;
/// Formation drop per wall touch
const FORMATION_DROP: f32 = 20.0;
pub const SHOT_SIZE: Vec2 = Vec2::new(5.0, 15.0);
const PLAYER_SHOT_DY: f32 = -7.0;
const ENEMY_SHOT_DY: f32 = 5.0;
const SHOT_COOLDOWN_MS: u32 = 500;
pub const BUNKER_SIZE: Vec2 = Vec2::new(60.0, 40.0);

/// Selectable player ships
pub const SHIP_COUNT: usize = 3;

pub const KILL_POINTS: u64 = 100;
/// Damage at which a bunker is gone
pub const BUNKER_HP: u32 = 100;
const ENEMY_SHOT_DAMAGE: u32 = 20;
const PLAYER_SHOT_DAMAGE: u32 = 10;

fn ms_to_ticks(ms: u32) -> u32 {
    (ms * TICKS_PER_SECOND).div_ceil(1000)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shooter {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub owner: Shooter,
    pub bounds: Aabb,
    pub dy: f32,
    pub active: bool,
}

impl Shot {
    fn new(owner: Shooter, x: f32, y: f32) -> Self {
        let dy = match owner {
            Shooter::Player => PLAYER_SHOT_DY,
            Shooter::Enemy => ENEMY_SHOT_DY,
        };
        Self {
            owner,
            bounds: Aabb::new(x, y, SHOT_SIZE.x, SHOT_SIZE.y),
            dy,
            active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub bounds: Aabb,
    pub row: usize,
    pub col: usize,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bunker {
    pub bounds: Aabb,
    pub damage: u32,
}

impl Bunker {
    pub fn is_standing(&self) -> bool {
        self.damage < BUNKER_HP
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invaders {
    pub params: ShooterParams,
    /// Top-left of the player ship
    pub player: Vec2,
    pub enemies: Vec<Enemy>,
    pub bunkers: Vec<Bunker>,
    pub shots: Vec<Shot>,
    /// +1 moving right, -1 moving left
    pub direction: f32,
    /// Chosen ship, kept across levels and lives
    #[serde(default)]
    pub ship: usize,
    shot_cooldown: u32,
    fire_counter: u32,
    #[serde(skip)]
    held: HeldActions,
}

impl Default for Invaders {
    fn default() -> Self {
        let params = level::shooter(1);
        Self {
            player: Vec2::new(params.canvas.x / 2.0 - PLAYER_SIZE.x / 2.0, params.canvas.y - 50.0),
            params,
            enemies: Vec::new(),
            bunkers: Vec::new(),
            shots: Vec::new(),
            direction: 1.0,
            ship: 0,
            shot_cooldown: 0,
            fire_counter: 0,
            held: HeldActions::default(),
        }
    }
}

impl Invaders {
    pub fn canvas(&self) -> Vec2 {
        self.params.canvas
    }

    pub fn player_box(&self) -> Aabb {
        Aabb::from_pos(self.player, PLAYER_SIZE)
    }

    pub fn enemies_left(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    fn spawn_formation(&mut self) {
        let (rows, cols) = (self.params.rows, self.params.cols);
        let total = cols as f32 * (ENEMY_SIZE.x + ENEMY_GAP) - ENEMY_GAP;
        let start_x = (self.canvas().x - total) / 2.0;
        self.enemies = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| Enemy {
                bounds: Aabb::new(
                    start_x + col as f32 * (ENEMY_SIZE.x + ENEMY_GAP),
                    FORMATION_TOP + row as f32 * (ENEMY_SIZE.y + ENEMY_GAP),
                    ENEMY_SIZE.x,
                    ENEMY_SIZE.y,
                ),
                row,
                col,
                active: true,
            })
            .collect();
    }

    fn spawn_bunkers(&mut self) {
        let count = self.params.bunkers;
        let gap = self.canvas().x / (count + 1) as f32;
        let y = self.canvas().y - 150.0;
        self.bunkers = (0..count)
            .map(|i| Bunker {
                bounds: Aabb::new(
                    gap * (i + 1) as f32 - BUNKER_SIZE.x / 2.0,
                    y,
                    BUNKER_SIZE.x,
                    BUNKER_SIZE.y,
                ),
                damage: 0,
            })
            .collect();
    }

    fn move_player(&mut self) {
        let max_x = self.canvas().x - PLAYER_SIZE.x;
        self.player.x = (self.player.x + self.held.horizontal() * PLAYER_SPEED).clamp(0.0, max_x);

        self.shot_cooldown = self.shot_cooldown.saturating_sub(1);
        let firing = self.held.is_held(Action::A) || self.held.is_held(Action::Up);
        if firing && self.shot_cooldown == 0 {
            let x = self.player.x + PLAYER_SIZE.x / 2.0 - SHOT_SIZE.x / 2.0;
            self.shots.push(Shot::new(Shooter::Player, x, self.player.y));
            self.shot_cooldown = ms_to_ticks(SHOT_COOLDOWN_MS);
        }
    }

    fn move_shots(&mut self) {
        let height = self.canvas().y;
        for shot in &mut self.shots {
            shot.bounds.y += shot.dy;
            if shot.bounds.y < 0.0 || shot.bounds.y > height {
                shot.active = false;
            }
        }
    }

    /// Slide the formation; touching a wall flips direction and drops a row
    fn move_formation(&mut self) {
        let dx = self.params.enemy_speed * self.direction;
        let mut left = f32::MAX;
        let mut right = f32::MIN;
        for e in self.enemies.iter_mut().filter(|e| e.active) {
            e.bounds.x += dx;
            left = left.min(e.bounds.x);
            right = right.max(e.bounds.right());
        }

        let width = self.canvas().x;
        if left <= 0.0 || right >= width {
            // Pull back inside before dropping
            let nudge = if left < 0.0 {
                -left
            } else if right > width {
                width - right
            } else {
                0.0
            };
            self.direction = -self.direction;
            for e in self.enemies.iter_mut().filter(|e| e.active) {
                e.bounds.x += nudge;
                e.bounds.y += FORMATION_DROP;
            }
        }
    }

    fn enemy_fire(&mut self, rng: &mut Pcg32) {
        self.fire_counter += 1;
        if self.fire_counter < ms_to_ticks(self.params.fire_interval_ms as u32) {
            return;
        }
        let shooters: Vec<Aabb> = self
            .enemies
            .iter()
            .filter(|e| e.active)
            .map(|e| e.bounds)
            .collect();
        if shooters.is_empty() {
            return;
        }
        let from = shooters[rng.random_range(0..shooters.len())];
        self.shots
            .push(Shot::new(Shooter::Enemy, from.x + from.w / 2.0, from.bottom()));
        self.fire_counter = 0;
    }

    /// Resolve shots; returns (points, player hit)
    fn resolve_hits(&mut self) -> (u64, bool) {
        let mut points = 0;
        let mut player_hit = false;
        let player = self.player_box();

        for shot in self.shots.iter_mut().filter(|s| s.active) {
            match shot.owner {
                Shooter::Enemy => {
                    if shot.bounds.overlaps(&player) {
                        shot.active = false;
                        player_hit = true;
                        continue;
                    }
                    if let Some(bunker) = self
                        .bunkers
                        .iter_mut()
                        .find(|b| b.is_standing() && b.bounds.overlaps(&shot.bounds))
                    {
                        shot.active = false;
                        bunker.damage += ENEMY_SHOT_DAMAGE;
                    }
                }
                Shooter::Player => {
                    // Enemies first so a shot touching both scores
                    if let Some(enemy) = self
                        .enemies
                        .iter_mut()
                        .find(|e| e.active && e.bounds.overlaps(&shot.bounds))
                    {
                        shot.active = false;
                        enemy.active = false;
                        points += KILL_POINTS;
                        continue;
                    }
                    if let Some(bunker) = self
                        .bunkers
                        .iter_mut()
                        .find(|b| b.is_standing() && b.bounds.overlaps(&shot.bounds))
                    {
                        shot.active = false;
                        bunker.damage += PLAYER_SHOT_DAMAGE;
                    }
                }
            }
        }

        self.shots.retain(|s| s.active);
        (points, player_hit)
    }
}

impl Game for Invaders {
    const KIND: GameKind = GameKind::SpaceInvaders;
    const SAVES_PROGRESS: bool = true;

    fn enter_level(&mut self, level: u32, _rng: &mut Pcg32) {
        self.params = level::shooter(level);
        log::debug!(
            "invaders level {}: {}x{} formation, speed {:.1}, fire every {}ms, {} bunkers",
            level,
            self.params.rows,
            self.params.cols,
            self.params.enemy_speed,
            self.params.fire_interval_ms,
            self.params.bunkers
        );
        let canvas = self.canvas();
        self.player = Vec2::new(canvas.x / 2.0 - PLAYER_SIZE.x / 2.0, canvas.y - 50.0);
        self.shots.clear();
        self.direction = 1.0;
        self.shot_cooldown = 0;
        self.fire_counter = 0;
        self.held.clear();
        self.spawn_formation();
        self.spawn_bunkers();
    }

    fn reset_life(&mut self, _level: u32, _rng: &mut Pcg32) {
        self.shots.retain(|s| s.owner == Shooter::Player);
        self.held.clear();
    }

    fn input(&mut self, event: InputEvent) {
        self.held.apply(event);
    }

    fn select_ship(&mut self, index: usize) -> bool {
        if index >= SHIP_COUNT {
            return false;
        }
        self.ship = index;
        true
    }

    fn step(&mut self, _level: u32, rng: &mut Pcg32) -> Step {
        self.move_player();
        self.move_shots();
        self.move_formation();

        if self
            .enemies
            .iter()
            .any(|e| e.active && e.bounds.bottom() >= self.player.y)
        {
            return Step::default().with(Outcome::Fatal);
        }

        self.enemy_fire(rng);

        let (points, player_hit) = self.resolve_hits();
        let mut step = Step::points(points);
        if player_hit {
            step = step.with(Outcome::LifeLost);
        } else if self.enemies_left() == 0 {
            step = step.with(Outcome::LevelComplete { bonus: 0 });
        }
        step
    }

    fn canvas_size(&self) -> Vec2 {
        self.canvas()
    }

    fn player_bounds(&self) -> Aabb {
        self.player_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn setup() -> (Invaders, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut game = Invaders::default();
        game.enter_level(1, &mut rng);
        // Freeze the formation and silence enemy fire
        game.params.enemy_speed = 0.0;
        game.params.fire_interval_ms = 1_000_000.0;
        (game, rng)
    }

    /// Player shot that lands on `target` after this tick's move
    fn shot_into(target: Aabb) -> Shot {
        Shot::new(Shooter::Player, target.x + 10.0, target.y + 5.0 - PLAYER_SHOT_DY)
    }

    #[test]
    fn test_ship_choice_survives_levels() {
        let (mut game, mut rng) = setup();
        assert!(game.select_ship(1));
        assert!(!game.select_ship(SHIP_COUNT));
        game.enter_level(2, &mut rng);
        game.reset_life(2, &mut rng);
        assert_eq!(game.ship, 1);
    }

    #[test]
    fn test_formation_layout() {
        let (game, _) = setup();
        assert_eq!(game.enemies.len(), 3 * 6);
        assert_eq!(game.bunkers.len(), 4);
        let first = game.enemies[0].bounds;
        let last = game.enemies[5].bounds;
        // Centered horizontally
        assert!((first.x - (game.canvas().x - last.right())).abs() < 1e-3);
        assert_eq!(first.y, FORMATION_TOP);
    }

    #[test]
    fn test_overlapping_shots_score_once() {
        let (mut game, mut rng) = setup();
        let target = game.enemies[0].bounds;
        game.shots.push(shot_into(target));
        game.shots.push(shot_into(target));

        let step = game.step(1, &mut rng);
        assert_eq!(step.points, KILL_POINTS);
        assert!(!game.enemies[0].active);
        // The second shot found nothing and keeps flying
        assert_eq!(game.shots.len(), 1);
        assert_eq!(game.enemies_left(), 3 * 6 - 1);
    }

    #[test]
    fn test_enemy_hit_beats_bunker() {
        let (mut game, mut rng) = setup();
        let target = game.enemies[0].bounds;
        game.bunkers[0].bounds = target;
        game.shots.push(shot_into(target));
        let step = game.step(1, &mut rng);
        assert_eq!(step.points, KILL_POINTS);
        assert_eq!(game.bunkers[0].damage, 0);
    }

    #[test]
    fn test_bunker_absorbs_until_destroyed() {
        let (mut game, mut rng) = setup();
        let bunker = game.bunkers[0].bounds;
        for _ in 0..5 {
            game.shots
                .push(Shot::new(Shooter::Enemy, bunker.x + 5.0, bunker.y - ENEMY_SHOT_DY + 1.0));
            game.step(1, &mut rng);
        }
        assert_eq!(game.bunkers[0].damage, 100);
        assert!(!game.bunkers[0].is_standing());

        // A crumbled bunker lets shots through
        game.shots
            .push(Shot::new(Shooter::Player, bunker.x + 5.0, bunker.y + 5.0 - PLAYER_SHOT_DY));
        game.step(1, &mut rng);
        assert_eq!(game.bunkers[0].damage, 100);
        assert_eq!(game.shots.len(), 1);
    }

    #[test]
    fn test_enemy_shot_costs_life() {
        let (mut game, mut rng) = setup();
        let player = game.player_box();
        game.shots
            .push(Shot::new(Shooter::Enemy, player.x + 10.0, player.y - ENEMY_SHOT_DY + 1.0));
        let step = game.step(1, &mut rng);
        assert_eq!(step.outcome, Some(Outcome::LifeLost));
        assert!(game.shots.is_empty());
    }

    #[test]
    fn test_wall_touch_flips_and_drops() {
        let (mut game, mut rng) = setup();
        game.params.enemy_speed = 3.0;
        let right = game.enemies.iter().map(|e| e.bounds.right()).fold(0.0, f32::max);
        let shift = game.canvas().x - right - 1.0;
        for e in &mut game.enemies {
            e.bounds.x += shift;
        }
        let y = game.enemies[0].bounds.y;

        game.step(1, &mut rng);
        assert_eq!(game.direction, -1.0);
        assert_eq!(game.enemies[0].bounds.y, y + FORMATION_DROP);
        // Pulled back inside the canvas
        assert!(game.enemies.iter().all(|e| e.bounds.right() <= game.canvas().x));
    }

    #[test]
    fn test_reaching_player_row_is_fatal() {
        let (mut game, mut rng) = setup();
        game.enemies[0].bounds.y = game.player.y - ENEMY_SIZE.y + 1.0;
        assert_eq!(game.step(1, &mut rng).outcome, Some(Outcome::Fatal));
    }

    #[test]
    fn test_last_kill_completes_level() {
        let (mut game, mut rng) = setup();
        for e in game.enemies.iter_mut().skip(1) {
            e.active = false;
        }
        let target = game.enemies[0].bounds;
        game.shots.push(shot_into(target));
        let step = game.step(1, &mut rng);
        assert_eq!(step.points, KILL_POINTS);
        assert_eq!(step.outcome, Some(Outcome::LevelComplete { bonus: 0 }));
    }

    #[test]
    fn test_fire_cooldown() {
        let (mut game, mut rng) = setup();
        game.input(InputEvent::press(Action::A));
        for _ in 0..30 {
            game.step(1, &mut rng);
        }
        // One shot at tick 1, the next only after 30 ticks of cooldown
        let player_shots = game.shots.iter().filter(|s| s.owner == Shooter::Player).count();
        assert_eq!(player_shots, 1);
        game.step(1, &mut rng);
        let player_shots = game.shots.iter().filter(|s| s.owner == Shooter::Player).count();
        assert_eq!(player_shots, 2);
    }

    #[test]
    fn test_player_clamped_to_canvas() {
        let (mut game, mut rng) = setup();
        game.input(InputEvent::press(Action::Left));
        for _ in 0..200 {
            game.step(1, &mut rng);
        }
        assert_eq!(game.player.x, 0.0);
    }

    #[test]
    fn test_canvas_widens_with_level() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut game = Invaders::default();
        game.enter_level(25, &mut rng);
        assert_eq!(game.canvas().x, 1000.0);
        assert_eq!(game.bunkers.len(), 2);
    }
}
