//! Maze chase
//!
//! Positions are in tile units with the tile center at integer coordinates.
//! Movers only change direction near a tile center and are snapped onto the
//! grid line when they do, which keeps them inside corridors.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::platform::{Action, HeldActions, InputEvent};
use crate::sim::collision::Aabb;
use crate::sim::level::{self, GHOST_SPEED_JITTER, MazeParams};
use crate::sim::mazes::MazeLayout;
use crate::sim::{Game, GameKind, Outcome, Step};

/// Pixels per tile
pub const TILE: f32 = 20.0;
pub const PLAYER_SPEED: f32 = 0.1;
pub const PELLET_POINTS: u64 = 10;

/// Max distance from a grid line at which a turn is accepted
const CORNER_TOLERANCE: f32 = 0.55;
/// Leading-edge lookahead for wall checks
const LOOKAHEAD: f32 = 0.35;
/// Ghost-player distance that costs a life
const CONTACT: f32 = 0.8;
const TURN_CHANCE: f32 = 0.2;

fn step_of(dir: Action) -> Vec2 {
    let (dx, dy) = dir.delta();
    Vec2::new(dx as f32, dy as f32)
}

fn solid(layout: &MazeLayout, x: f32, y: f32) -> bool {
    layout.is_wall(x.floor() as i32, y.floor() as i32)
}

/// Player or ghost moving on the maze grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub pos: Vec2,
    pub dir: Option<Action>,
    /// Buffered turn, applied at the next tile center that allows it
    pub next: Option<Action>,
    pub speed: f32,
}

impl Mover {
    fn at(tile: (usize, usize), speed: f32) -> Self {
        Self {
            pos: Vec2::new(tile.0 as f32, tile.1 as f32),
            dir: None,
            next: None,
            speed,
        }
    }

    fn try_turn(&mut self, layout: &MazeLayout) {
        let Some(next) = self.next else {
            return;
        };
        if Some(next) == self.dir {
            self.next = None;
            return;
        }

        let vertical = matches!(next, Action::Up | Action::Down);
        let off = if vertical {
            (self.pos.x - self.pos.x.round()).abs()
        } else {
            (self.pos.y - self.pos.y.round()).abs()
        };
        if off >= CORNER_TOLERANCE {
            return;
        }

        let mut snap = self.pos.round();
        // Never snap into a wall; take the tile on the other side instead
        if vertical && solid(layout, snap.x, self.pos.y) {
            snap.x = if self.pos.x < snap.x {
                self.pos.x.floor()
            } else {
                self.pos.x.ceil()
            };
        }
        if !vertical && solid(layout, self.pos.x, snap.y) {
            snap.y = if self.pos.y < snap.y {
                self.pos.y.floor()
            } else {
                self.pos.y.ceil()
            };
        }

        let ahead = snap + step_of(next);
        if !solid(layout, ahead.x, ahead.y) {
            self.dir = Some(next);
            self.next = None;
            self.pos = snap;
        }
    }

    /// Turn if buffered, then move; returns false when blocked
    fn advance(&mut self, layout: &MazeLayout) -> bool {
        self.try_turn(layout);

        let mut moved = false;
        if let Some(dir) = self.dir {
            let delta = step_of(dir);
            let target = self.pos + delta * self.speed;
            let ahead = target + delta * LOOKAHEAD;
            if !solid(layout, ahead.x, ahead.y) {
                self.pos = target;
                moved = true;
            }
        }

        let cols = layout.cols as f32;
        if self.pos.x < 0.0 {
            self.pos.x = cols - 1.0;
            moved = true;
        } else if self.pos.x >= cols {
            self.pos.x = 0.0;
            moved = true;
        }
        moved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    pub params: MazeParams,
    pub layout: MazeLayout,
    pub player: Mover,
    pub ghosts: Vec<Mover>,
    #[serde(skip)]
    held: HeldActions,
}

impl Default for Maze {
    fn default() -> Self {
        let params = level::maze(1);
        let layout = MazeLayout::load(params.maze);
        Self {
            player: Mover::at(layout.player_start, PLAYER_SPEED),
            params,
            layout,
            ghosts: Vec::new(),
            held: HeldActions::default(),
        }
    }
}

impl Maze {
    fn spawn(&mut self, rng: &mut Pcg32) {
        self.player = Mover::at(self.layout.player_start, PLAYER_SPEED);
        self.player.next = self.held.latest_direction();

        let fallback = (self.layout.cols / 2, self.layout.rows / 2);
        let starts = &self.layout.ghost_starts;
        self.ghosts = (0..self.params.ghosts)
            .map(|i| {
                let tile = if starts.is_empty() {
                    fallback
                } else {
                    starts[i % starts.len()]
                };
                let jitter = rng.random::<f32>() * GHOST_SPEED_JITTER;
                Mover::at(tile, self.params.ghost_speed + jitter)
            })
            .collect();
    }

    /// Random turns at junctions and corners; never reverses unless it must
    fn steer(ghost: &mut Mover, layout: &MazeLayout, rng: &mut Pcg32) {
        let centered = (ghost.pos - ghost.pos.round()).abs().max_element() < ghost.speed * 1.5;
        if !centered {
            return;
        }

        let here = ghost.pos.round();
        let open: Vec<Action> = Action::DIRECTIONS
            .into_iter()
            .filter(|d| {
                let t = here + step_of(*d);
                !solid(layout, t.x, t.y)
            })
            .collect();
        let forward: Vec<Action> = open
            .iter()
            .copied()
            .filter(|d| ghost.dir.is_none_or(|cur| *d != cur.opposite()))
            .collect();
        let choices = if forward.is_empty() { &open } else { &forward };
        if choices.is_empty() {
            return;
        }

        let exits = layout.exits(here.x as i32, here.y as i32);
        let straight = exits == 2
            && (open.contains(&Action::Up) && open.contains(&Action::Down)
                || open.contains(&Action::Left) && open.contains(&Action::Right));
        let decision_point = exits > 2 || (exits == 2 && !straight);

        if (decision_point && rng.random::<f32>() < TURN_CHANCE) || ghost.dir.is_none() {
            ghost.next = Some(choices[rng.random_range(0..choices.len())]);
        }
    }

    fn move_ghosts(&mut self, rng: &mut Pcg32) {
        for ghost in &mut self.ghosts {
            Self::steer(ghost, &self.layout, rng);
            if !ghost.advance(&self.layout) {
                ghost.next = ghost.dir.map(|d| d.opposite());
            }
        }
    }

    fn caught(&self) -> bool {
        self.ghosts
            .iter()
            .any(|g| g.pos.distance(self.player.pos) < CONTACT)
    }
}

impl Game for Maze {
    const KIND: GameKind = GameKind::Pacman;

    fn enter_level(&mut self, level: u32, rng: &mut Pcg32) {
        self.params = level::maze(level);
        self.layout = MazeLayout::load(self.params.maze);
        log::debug!(
            "maze level {}: layout {}, {} ghosts at {:.3} tiles/tick, {} pellets",
            level,
            self.params.maze,
            self.params.ghosts,
            self.params.ghost_speed,
            self.layout.pellets_left()
        );
        self.spawn(rng);
    }

    fn reset_life(&mut self, _level: u32, rng: &mut Pcg32) {
        self.spawn(rng);
    }

    fn input(&mut self, event: InputEvent) {
        self.held.apply(event);
        if event.action.is_direction() {
            self.player.next = self.held.latest_direction();
        }
    }

    fn step(&mut self, _level: u32, rng: &mut Pcg32) -> Step {
        // The player only moves while its direction is held
        if self.player.dir.is_some_and(|d| !self.held.is_held(d)) {
            self.player.dir = None;
        }
        self.player.advance(&self.layout);

        let tile = self.player.pos.round();
        let mut step = Step::default();
        if self.layout.eat(tile.x as i32, tile.y as i32) {
            step.points += PELLET_POINTS;
            if self.layout.pellets_left() == 0 {
                return step.with(Outcome::LevelComplete { bonus: 0 });
            }
        }

        self.move_ghosts(rng);
        if self.caught() {
            step = step.with(Outcome::LifeLost);
        }
        step
    }

    fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.layout.cols as f32, self.layout.rows as f32) * TILE
    }

    fn player_bounds(&self) -> Aabb {
        Aabb::from_pos(self.player.pos * TILE, Vec2::splat(TILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mazes::Tile;
    use proptest::prelude::*;
    use rand::SeedableRng;

    /// Classic layout with the ghosts removed
    fn empty_maze() -> (Maze, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut game = Maze::default();
        game.enter_level(1, &mut rng);
        game.ghosts.clear();
        (game, rng)
    }

    fn run(game: &mut Maze, rng: &mut Pcg32, ticks: usize) -> Step {
        let mut total = Step::default();
        for _ in 0..ticks {
            total.merge(game.step(1, rng));
        }
        total
    }

    #[test]
    fn test_pellet_scores_once() {
        let (mut game, mut rng) = empty_maze();
        assert_eq!(game.player.pos, Vec2::new(9.0, 15.0));
        let before = game.layout.pellets_left();

        game.input(InputEvent::press(Action::Right));
        let step = run(&mut game, &mut rng, 6);
        assert_eq!(step.points, PELLET_POINTS);
        assert_eq!(game.layout.pellets_left(), before - 1);
        assert_eq!(game.layout.tile(10, 15), Tile::Empty);
    }

    #[test]
    fn test_wall_blocks_turn() {
        let (mut game, mut rng) = empty_maze();
        // Directly below the start is wall
        game.input(InputEvent::press(Action::Down));
        run(&mut game, &mut rng, 10);
        assert_eq!(game.player.pos, Vec2::new(9.0, 15.0));
        assert_eq!(game.player.dir, None);
    }

    #[test]
    fn test_release_stops_player() {
        let (mut game, mut rng) = empty_maze();
        game.input(InputEvent::press(Action::Left));
        run(&mut game, &mut rng, 3);
        game.input(InputEvent::release(Action::Left));
        let x = game.player.pos.x;
        run(&mut game, &mut rng, 3);
        assert_eq!(game.player.pos.x, x);
    }

    #[test]
    fn test_turn_snaps_within_tolerance() {
        let (mut game, mut rng) = empty_maze();
        game.player.pos = Vec2::new(8.45, 15.0);
        game.player.dir = Some(Action::Right);
        game.input(InputEvent::press(Action::Up));
        game.step(1, &mut rng);
        assert_eq!(game.player.dir, Some(Action::Up));
        assert_eq!(game.player.pos.x, 8.0);
        assert!(game.player.pos.y < 15.0);
    }

    #[test]
    fn test_tunnel_wraps() {
        let (mut game, mut rng) = empty_maze();
        game.player.pos = Vec2::new(0.05, 9.0);
        game.input(InputEvent::press(Action::Left));
        game.player.dir = Some(Action::Left);
        game.step(1, &mut rng);
        assert_eq!(game.player.pos.x, (game.layout.cols - 1) as f32);
    }

    #[test]
    fn test_ghost_contact_costs_life() {
        let (mut game, mut rng) = empty_maze();
        let mut ghost = Mover::at((9, 15), 0.0);
        ghost.pos.x += 0.5;
        game.ghosts.push(ghost);
        assert_eq!(game.step(1, &mut rng).outcome, Some(Outcome::LifeLost));

        game.reset_life(1, &mut rng);
        assert_eq!(game.player.pos, Vec2::new(9.0, 15.0));
        assert_eq!(game.ghosts.len(), game.params.ghosts);
    }

    #[test]
    fn test_last_pellet_completes_level() {
        let (mut game, mut rng) = empty_maze();
        for row in 0..game.layout.rows as i32 {
            for col in 0..game.layout.cols as i32 {
                if (col, row) != (10, 15) {
                    game.layout.eat(col, row);
                }
            }
        }
        assert_eq!(game.layout.pellets_left(), 1);

        game.input(InputEvent::press(Action::Right));
        let step = run(&mut game, &mut rng, 6);
        assert_eq!(step.points, PELLET_POINTS);
        assert_eq!(step.outcome, Some(Outcome::LevelComplete { bonus: 0 }));
    }

    #[test]
    fn test_ghost_count_follows_level() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut game = Maze::default();
        game.enter_level(7, &mut rng);
        assert_eq!(game.ghosts.len(), 7);
        assert!(game.ghosts.iter().all(|g| {
            g.speed >= game.params.ghost_speed
                && g.speed < game.params.ghost_speed + GHOST_SPEED_JITTER
        }));
    }

    proptest! {
        #[test]
        fn ghosts_stay_on_the_grid(seed in any::<u64>(), level in 1u32..=50) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut game = Maze::default();
            game.enter_level(level, &mut rng);
            let (cols, rows) = (game.layout.cols as f32, game.layout.rows as f32);
            for _ in 0..600 {
                game.move_ghosts(&mut rng);
                for g in &game.ghosts {
                    prop_assert!(g.pos.x >= 0.0 && g.pos.x < cols);
                    prop_assert!(g.pos.y >= 0.0 && g.pos.y < rows);
                }
            }
        }
    }
}
