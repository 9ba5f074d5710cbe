//! Per-game scene drawing
//!
//! Static geometry first, then transient entities, then the player. Scenes
//! only read game state.

use glam::Vec2;

use super::canvas::{Canvas, colors};
use super::sprites::{SpriteId, SpriteSheet};
use crate::games::blocks::{self, Blocks};
use crate::games::climber::{self, Climber};
use crate::games::frogger::{self, Frogger};
use crate::games::invaders::{self, Invaders, Shooter};
use crate::games::maze::{self, Maze};
use crate::games::racing::{self, ObstacleKind, Racing};
use crate::sim::collision::Aabb;
use crate::sim::level::{LaneKind, LaneObjectKind};
use crate::sim::mazes::Tile;

pub trait Scene {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet);
}

impl Scene for Invaders {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet) {
        canvas.clear(colors::BACKGROUND);

        for bunker in self.bunkers.iter().filter(|b| b.is_standing()) {
            // Fade as damage builds up
            let alpha = 255 - (bunker.damage * 200 / invaders::BUNKER_HP) as u8;
            sprites.draw(canvas, SpriteId::Bunker, bunker.bounds, colors::BUNKER.with_alpha(alpha));
        }

        let variant = SpriteId::Enemy(self.params.sprite_variant);
        for enemy in self.enemies.iter().filter(|e| e.active) {
            sprites.draw(canvas, variant, enemy.bounds, colors::ENEMY);
        }
        for shot in &self.shots {
            let color = match shot.owner {
                Shooter::Player => colors::PLAYER_SHOT,
                Shooter::Enemy => colors::ENEMY_SHOT,
            };
            canvas.fill_rect(shot.bounds, color);
        }

        let livery = colors::SHIPS[self.ship % colors::SHIPS.len()];
        sprites.draw(canvas, SpriteId::Ship(self.ship), self.player_box(), livery);
    }
}

impl Scene for Blocks {
    fn draw(&self, canvas: &mut Canvas, _sprites: &SpriteSheet) {
        canvas.clear(colors::BACKGROUND);
        let cell = |col: i32, row: i32| {
            Aabb::new(
                col as f32 * blocks::BLOCK,
                row as f32 * blocks::BLOCK,
                blocks::BLOCK - 1.0,
                blocks::BLOCK - 1.0,
            )
        };

        for (r, row) in self.grid.iter().enumerate() {
            for (c, slot) in row.iter().enumerate() {
                let color = match slot {
                    Some(kind) => colors::PIECES[*kind as usize],
                    None => colors::GRID_LINE,
                };
                canvas.fill_rect(cell(c as i32, r as i32), color);
            }
        }

        // Preview in the top-right corner at half size
        if let Some(next) = self.next {
            let size = blocks::BLOCK / 2.0;
            let origin = Vec2::new(canvas.size().x - 5.0 * size, size);
            for (c, r) in next.shape().cells() {
                let rect = Aabb::new(origin.x + c as f32 * size, origin.y + r as f32 * size, size, size);
                canvas.fill_rect(rect, colors::PIECES[next as usize].with_alpha(160));
            }
        }

        if let Some(piece) = &self.piece {
            let color = colors::PIECES[piece.kind as usize];
            for (c, r) in piece.shape.cells() {
                canvas.fill_rect(cell(piece.x + c, piece.y + r), color);
            }
        }
    }
}

impl Scene for Maze {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet) {
        canvas.clear(colors::BACKGROUND);
        let layout = &self.layout;

        for row in 0..layout.rows as i32 {
            for col in 0..layout.cols as i32 {
                let origin = Vec2::new(col as f32, row as f32) * maze::TILE;
                match layout.tile(col, row) {
                    Tile::Wall => canvas.fill_rect(
                        Aabb::from_pos(origin, Vec2::splat(maze::TILE)),
                        colors::WALL,
                    ),
                    Tile::Pellet => canvas.fill_circle(
                        origin + Vec2::splat(maze::TILE / 2.0),
                        maze::TILE * 0.15,
                        colors::PELLET,
                    ),
                    Tile::Empty => {}
                }
            }
        }

        for (i, ghost) in self.ghosts.iter().enumerate() {
            let bounds = Aabb::from_pos(ghost.pos * maze::TILE, Vec2::splat(maze::TILE));
            let color = colors::GHOSTS[i % colors::GHOSTS.len()];
            sprites.draw(canvas, SpriteId::Ghost(i % colors::GHOSTS.len()), bounds, color);
        }

        let player = Aabb::from_pos(self.player.pos * maze::TILE, Vec2::splat(maze::TILE));
        if sprites.get(SpriteId::Pacman).is_some() {
            sprites.draw(canvas, SpriteId::Pacman, player, colors::PACMAN);
        } else {
            canvas.fill_circle(player.center(), maze::TILE * 0.45, colors::PACMAN);
        }
    }
}

impl Scene for Climber {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet) {
        canvas.clear(colors::BACKGROUND);
        let stage = &self.params.stage;

        for ladder in &stage.ladders {
            canvas.stroke_rect(*ladder, 2.0, colors::LADDER);
            let mut y = ladder.y + 8.0;
            while y < ladder.bottom() {
                canvas.fill_rect(Aabb::new(ladder.x, y, ladder.w, 2.0), colors::LADDER);
                y += 10.0;
            }
        }
        for floor in &stage.floors {
            let color = if *floor == stage.goal {
                colors::GOAL
            } else {
                colors::GIRDER
            };
            canvas.fill_rect(*floor, color);
        }

        for barrel in &self.barrels {
            let r = climber::BARREL_RADIUS;
            if sprites.get(SpriteId::Barrel).is_some() {
                let bounds = Aabb::new(barrel.pos.x - r, barrel.pos.y - r, r * 2.0, r * 2.0);
                sprites.draw(canvas, SpriteId::Barrel, bounds, colors::BARREL);
            } else {
                canvas.fill_circle(barrel.pos, r, colors::BARREL);
            }
        }

        sprites.draw(
            canvas,
            SpriteId::Climber,
            Aabb::from_pos(self.player.pos, climber::PLAYER_SIZE),
            colors::CLIMBER,
        );
    }
}

impl Scene for Frogger {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet) {
        let grid = frogger::GRID;
        for (row, lane) in self.lanes.iter().enumerate() {
            let y = row as f32 * grid;
            let color = match lane.def.kind {
                LaneKind::Home => colors::HOME,
                LaneKind::River => colors::WATER,
                LaneKind::Safe => colors::VERGE,
                LaneKind::Road => colors::ROAD,
            };
            canvas.fill_rect(Aabb::new(0.0, y, frogger::CANVAS.x, grid), color);

            if lane.def.kind == LaneKind::Home {
                let slot = frogger::CANVAS.x / frogger::HOME_SLOTS as f32;
                for (i, filled) in self.homes.iter().enumerate() {
                    let bay = Aabb::new(i as f32 * slot + slot / 2.0 - grid / 2.0, y, grid, grid);
                    let color = if *filled { colors::FROG } else { colors::WATER };
                    canvas.fill_rect(bay, color);
                }
            }
        }

        for (row, lane) in self.lanes.iter().enumerate() {
            let y = row as f32 * grid;
            for obj in &lane.objects {
                let (id, color) = match obj.kind {
                    LaneObjectKind::Log => (SpriteId::Log, colors::LOG),
                    LaneObjectKind::Turtle => (SpriteId::Turtle, colors::TURTLE),
                    LaneObjectKind::Car => (SpriteId::Car, colors::CAR),
                    LaneObjectKind::Truck => (SpriteId::Truck, colors::TRUCK),
                };
                let bounds = Aabb::new(obj.x, y + 4.0, obj.width, grid - 8.0);
                sprites.draw(canvas, id, bounds, color);
            }
        }

        sprites.draw(canvas, SpriteId::Frog, self.frog_bounds(), colors::FROG);
    }
}

impl Scene for Racing {
    fn draw(&self, canvas: &mut Canvas, sprites: &SpriteSheet) {
        canvas.clear(colors::TARMAC);

        // Dashed lane markings scroll with the road
        for lane in 1..racing::LANES {
            let x = lane as f32 * racing::LANE_WIDTH - 2.0;
            let mut y = self.scroll - racing::DASH_PERIOD;
            while y < racing::CANVAS.y {
                canvas.fill_rect(Aabb::new(x, y, 4.0, racing::DASH_PERIOD / 2.0), colors::LANE_MARK);
                y += racing::DASH_PERIOD;
            }
        }

        for obs in &self.obstacles {
            let (id, color) = match obs.kind {
                ObstacleKind::Rock => (SpriteId::Rock, colors::ROCK),
                ObstacleKind::Barrier => (SpriteId::Barrier, colors::BARRIER),
                ObstacleKind::Oil => (SpriteId::Oil, colors::OIL),
            };
            sprites.draw(canvas, id, obs.bounds, color);
        }

        sprites.draw(canvas, SpriteId::RaceCar, self.car_bounds(), colors::RACE_CAR);
    }
}
