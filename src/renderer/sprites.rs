//! Sprite sheet with solid-colour placeholders
//!
//! Sprites arrive already decoded as RGBA8 pixels. Anything not loaded is
//! drawn as a filled rectangle of the entity's bounds so a game stays
//! playable with no art at all.

use std::collections::HashMap;

use anyhow::ensure;

use super::canvas::{Canvas, Rgba, colors};
use crate::sim::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    /// Player ship, one per selectable livery
    Ship(usize),
    /// Formation sprite, one per variant
    Enemy(u32),
    Bunker,
    Pacman,
    Ghost(usize),
    Climber,
    Barrel,
    Frog,
    Log,
    Turtle,
    Car,
    Truck,
    RaceCar,
    Rock,
    Barrier,
    Oil,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl Sprite {
    /// Wrap decoded RGBA8 bytes
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> anyhow::Result<Self> {
        ensure!(
            bytes.len() == (width * height * 4) as usize,
            "sprite is {}x{} but has {} bytes",
            width,
            height,
            bytes.len()
        );
        Ok(Self {
            width,
            height,
            pixels: bytemuck::cast_slice(bytes).to_vec(),
        })
    }

    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    pub(crate) sprites: HashMap<SpriteId, Sprite>,
    /// Outline placeholders so missing art is easy to spot
    pub placeholder_outline: bool,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SpriteId, sprite: Sprite) {
        self.sprites.insert(id, sprite);
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Draw a sprite stretched over `bounds`, or `fallback` if it isn't loaded
    pub fn draw(&self, canvas: &mut Canvas, id: SpriteId, bounds: Aabb, fallback: Rgba) {
        match self.sprites.get(&id) {
            Some(sprite) => canvas.blit_scaled(&sprite.pixels, sprite.width, sprite.height, bounds),
            None => {
                canvas.fill_rect(bounds, fallback);
                if self.placeholder_outline {
                    canvas.stroke_rect(bounds, 1.0, colors::OUTLINE);
                }
            }
        }
    }
}
