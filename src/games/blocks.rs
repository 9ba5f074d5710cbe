//! Block stacking
//!
//! Tetromino well with gravity on a tick counter. The level is
//! driven by cleared lines; every ten levels the well widens by two columns
//! with the existing stack kept centred.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::platform::{Action, InputEvent};
use crate::sim::collision::Aabb;
use crate::sim::level::{self, line_points, stacking_level_for_lines};
use crate::sim::{Game, GameKind, Outcome, Step};

pub const ROWS: usize = 20;
/// Cell size in pixels
pub const BLOCK: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Spawn orientation, row-major
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape(rows.iter().map(|r| r.iter().map(|c| *c != 0).collect()).collect())
    }

    fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Occupancy matrix of a piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape(pub Vec<Vec<bool>>);

impl Shape {
    pub fn width(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    /// Clockwise quarter turn
    pub fn rotated(&self) -> Shape {
        let h = self.height();
        Shape(
            (0..self.width())
                .map(|c| (0..h).map(|r| self.0[h - 1 - r][c]).collect())
                .collect(),
        )
    }

    /// Offsets of filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (c as i32, r as i32))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

pub type Cell = Option<PieceKind>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blocks {
    pub cols: usize,
    /// `ROWS` rows of `cols` cells, top row first
    pub grid: Vec<Vec<Cell>>,
    pub piece: Option<Piece>,
    /// Preview of the next spawn
    pub next: Option<PieceKind>,
    pub lines: u32,
    /// Gravity interval in ticks
    drop_ticks: u32,
    drop_counter: u32,
    #[serde(skip)]
    pending: Vec<Action>,
}

impl Blocks {
    fn collides(&self, x: i32, y: i32, shape: &Shape) -> bool {
        shape.cells().any(|(c, r)| {
            let (gx, gy) = (x + c, y + r);
            if gx < 0 || gx >= self.cols as i32 || gy >= ROWS as i32 {
                return true;
            }
            gy >= 0
                && self
                    .grid
                    .get(gy as usize)
                    .and_then(|row| row.get(gx as usize))
                    .is_some_and(Option::is_some)
        })
    }

    /// Promote the preview to the active piece. Returns false if it does not fit.
    fn spawn(&mut self, rng: &mut Pcg32) -> bool {
        let kind = self.next.take().unwrap_or_else(|| PieceKind::random(rng));
        self.next = Some(PieceKind::random(rng));
        let shape = kind.shape();
        let x = (self.cols / 2) as i32 - (shape.width() / 2) as i32;
        let fits = !self.collides(x, 0, &shape);
        self.piece = Some(Piece { kind, shape, x, y: 0 });
        fits
    }

    /// Check if the active piece fits after moving by (dx, dy)
    fn fits_at(&self, dx: i32, dy: i32) -> bool {
        self.piece
            .as_ref()
            .is_some_and(|p| !self.collides(p.x + dx, p.y + dy, &p.shape))
    }

    fn shift(&mut self, dx: i32) {
        if self.fits_at(dx, 0) {
            if let Some(p) = self.piece.as_mut() {
                p.x += dx;
            }
        }
    }

    /// Rotate with a basic wall kick: try x, x+1, x-1, x+2, x-2, ... out to
    /// the wider of the two orientations before giving up
    fn rotate(&mut self) {
        let Some(p) = &self.piece else { return };
        let rotated = p.shape.rotated();
        let limit = rotated.width().max(p.shape.width()) as i32;
        let kicked = std::iter::once(0)
            .chain((1..=limit).flat_map(|d| [d, -d]))
            .map(|d| p.x + d)
            .find(|&x| !self.collides(x, p.y, &rotated));
        if let (Some(x), Some(p)) = (kicked, self.piece.as_mut()) {
            p.shape = rotated;
            p.x = x;
        }
    }

    /// Move the piece down one row, locking it if it cannot move
    fn drop(&mut self, level: u32, rng: &mut Pcg32) -> Step {
        self.drop_counter = 0;
        if self.piece.is_none() {
            return Step::default();
        }
        if self.fits_at(0, 1) {
            if let Some(p) = self.piece.as_mut() {
                p.y += 1;
            }
            return Step::default();
        }
        self.lock(level, rng)
    }

    fn hard_drop(&mut self, level: u32, rng: &mut Pcg32) -> Step {
        while self.fits_at(0, 1) {
            if let Some(p) = self.piece.as_mut() {
                p.y += 1;
            }
        }
        self.drop(level, rng)
    }

    fn lock(&mut self, level: u32, rng: &mut Pcg32) -> Step {
        self.merge_piece();
        let cleared = self.sweep();
        self.lines += cleared as u32;
        let mut step = Step::points(line_points(cleared, level));

        if !self.spawn(rng) {
            return step.with(Outcome::Fatal);
        }
        if cleared > 0 && stacking_level_for_lines(self.lines) > level {
            step = step.with(Outcome::LevelComplete { bonus: 0 });
        }
        step
    }

    fn merge_piece(&mut self) {
        let Some(p) = self.piece.take() else { return };
        for (c, r) in p.shape.cells() {
            let (gx, gy) = (p.x + c, p.y + r);
            if gx < 0 || gy < 0 {
                continue;
            }
            if let Some(cell) = self
                .grid
                .get_mut(gy as usize)
                .and_then(|row| row.get_mut(gx as usize))
            {
                *cell = Some(p.kind);
            }
        }
    }

    /// Remove full rows, shifting everything above down. Returns rows cleared.
    fn sweep(&mut self) -> usize {
        let before = self.grid.len();
        self.grid.retain(|row| row.iter().any(Option::is_none));
        let cleared = before - self.grid.len();
        for _ in 0..cleared {
            self.grid.insert(0, vec![None; self.cols]);
        }
        cleared
    }

    /// Grow to `cols` columns keeping the stack centred
    fn widen(&mut self, cols: usize) {
        if cols <= self.cols {
            return;
        }
        let offset = (cols - self.cols) / 2;
        for row in &mut self.grid {
            let mut wide = vec![None; cols];
            wide[offset..offset + row.len()].copy_from_slice(row);
            *row = wide;
        }
        if let Some(p) = &mut self.piece {
            p.x += offset as i32;
        }
        log::info!("Well widened {} -> {} columns", self.cols, cols);
        self.cols = cols;
    }
}

impl Game for Blocks {
    const KIND: GameKind = GameKind::Tetris;

    fn enter_level(&mut self, level: u32, rng: &mut Pcg32) {
        let params = level::stacking(level);
        self.drop_ticks = (params.drop_interval_ms * TICKS_PER_SECOND).div_ceil(1000);
        log::debug!(
            "tetris level {}: {} cols, drop every {}ms",
            level,
            params.cols,
            params.drop_interval_ms
        );

        if level <= 1 || self.grid.is_empty() {
            self.cols = params.cols;
            self.grid = vec![vec![None; params.cols]; params.rows];
            self.lines = 0;
            self.next = None;
            self.pending.clear();
            self.drop_counter = 0;
            self.spawn(rng);
        } else {
            self.widen(params.cols);
        }
    }

    fn reset_life(&mut self, _level: u32, _rng: &mut Pcg32) {
        self.pending.clear();
    }

    fn input(&mut self, event: InputEvent) {
        if event.active {
            self.pending.push(event.action);
        }
    }

    fn step(&mut self, level: u32, rng: &mut Pcg32) -> Step {
        let mut step = Step::default();

        for action in std::mem::take(&mut self.pending) {
            match action {
                Action::Left => self.shift(-1),
                Action::Right => self.shift(1),
                Action::Up | Action::A => self.rotate(),
                Action::Down => step.merge(self.drop(level, rng)),
                Action::B => step.merge(self.hard_drop(level, rng)),
            }
            if step.is_terminal() {
                return step;
            }
        }

        self.drop_counter += 1;
        if self.drop_counter >= self.drop_ticks {
            step.merge(self.drop(level, rng));
        }
        step
    }

    fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * BLOCK, ROWS as f32 * BLOCK)
    }

    fn player_bounds(&self) -> Aabb {
        match &self.piece {
            Some(p) => Aabb::new(
                p.x as f32 * BLOCK,
                p.y as f32 * BLOCK,
                p.shape.width() as f32 * BLOCK,
                p.shape.height() as f32 * BLOCK,
            ),
            None => Aabb::default(),
        }
    }
}
