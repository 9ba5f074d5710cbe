//! RGBA8 software canvas

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sim::collision::Aabb;

/// One RGBA8 pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Source-over blend of `self` onto `dst`
    fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let a = a as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
                Rgba {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: 255,
                }
            }
        }
    }

    /// Push a channel away from mid-grey
    fn contrasted(self) -> Rgba {
        let push = |c: u8| {
            if c < 128 {
                c / 2
            } else {
                c + (255 - c) / 2
            }
        };
        Rgba {
            r: push(self.r),
            g: push(self.g),
            b: push(self.b),
            a: self.a,
        }
    }
}

/// Colors for game elements
pub mod colors {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::new(5, 5, 13);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255);
    pub const OUTLINE: Rgba = Rgba::new(255, 0, 255);

    pub const SHIP: Rgba = Rgba::new(51, 204, 102);
    /// Selectable ship liveries; the first is the default ship
    pub const SHIPS: [Rgba; 3] = [SHIP, Rgba::new(204, 102, 230), Rgba::new(240, 190, 60)];
    pub const ENEMY: Rgba = Rgba::new(230, 60, 60);
    pub const BUNKER: Rgba = Rgba::new(60, 180, 60);
    pub const PLAYER_SHOT: Rgba = Rgba::new(255, 255, 120);
    pub const ENEMY_SHOT: Rgba = Rgba::new(255, 120, 40);

    pub const PIECES: [Rgba; 7] = [
        Rgba::new(0, 240, 240),
        Rgba::new(0, 0, 240),
        Rgba::new(240, 160, 0),
        Rgba::new(240, 240, 0),
        Rgba::new(0, 240, 0),
        Rgba::new(160, 0, 240),
        Rgba::new(240, 0, 0),
    ];
    pub const GRID_LINE: Rgba = Rgba::new(30, 30, 40);

    pub const WALL: Rgba = Rgba::new(33, 33, 222);
    pub const PELLET: Rgba = Rgba::new(255, 184, 151);
    pub const PACMAN: Rgba = Rgba::new(255, 255, 0);
    pub const GHOSTS: [Rgba; 4] = [
        Rgba::new(255, 0, 0),
        Rgba::new(255, 184, 255),
        Rgba::new(0, 255, 255),
        Rgba::new(255, 184, 82),
    ];

    pub const GIRDER: Rgba = Rgba::new(200, 40, 80);
    pub const LADDER: Rgba = Rgba::new(0, 200, 220);
    pub const GOAL: Rgba = Rgba::new(255, 215, 0);
    pub const BARREL: Rgba = Rgba::new(150, 90, 40);
    pub const CLIMBER: Rgba = Rgba::new(230, 50, 50);

    pub const WATER: Rgba = Rgba::new(0, 0, 70);
    pub const ROAD: Rgba = Rgba::new(20, 20, 20);
    pub const VERGE: Rgba = Rgba::new(80, 0, 120);
    pub const HOME: Rgba = Rgba::new(0, 90, 0);
    pub const LOG: Rgba = Rgba::new(139, 69, 19);
    pub const TURTLE: Rgba = Rgba::new(0, 128, 64);
    pub const CAR: Rgba = Rgba::new(255, 80, 80);
    pub const TRUCK: Rgba = Rgba::new(200, 200, 200);
    pub const FROG: Rgba = Rgba::new(50, 205, 50);

    pub const TARMAC: Rgba = Rgba::new(51, 51, 51);
    pub const LANE_MARK: Rgba = Rgba::new(255, 255, 255);
    pub const RACE_CAR: Rgba = Rgba::new(0, 120, 255);
    pub const ROCK: Rgba = Rgba::new(136, 136, 136);
    pub const BARRIER: Rgba = Rgba::new(221, 0, 0);
    pub const OIL: Rgba = Rgba::new(0, 0, 0);
}

/// Fixed-size RGBA8 bitmap, row-major, origin top-left
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![colors::BACKGROUND; (width * height) as usize],
        }
    }

    /// Canvas covering a game's play area
    pub fn for_size(size: Vec2) -> Self {
        Self::new(size.x.ceil() as u32, size.y.ceil() as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Reallocate if the play area changed size (levels can widen the board)
    pub fn fit(&mut self, size: Vec2) {
        let (w, h) = (size.x.ceil() as u32, size.y.ceil() as u32);
        if (w, h) != (self.width, self.height) {
            *self = Self::new(w, h);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y * self.width + x) as usize;
        if let Some(px) = self.pixels.get_mut(idx) {
            *px = color.over(*px);
        }
    }

    /// Pixel span covered by `[lo, hi)`, clipped to `0..max`
    fn span(lo: f32, hi: f32, max: u32) -> std::ops::Range<u32> {
        let start = lo.round().clamp(0.0, max as f32) as u32;
        let end = hi.round().clamp(0.0, max as f32) as u32;
        start..end.max(start)
    }

    /// Fill a rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, rect: Aabb, color: Rgba) {
        let xs = Self::span(rect.x, rect.right(), self.width);
        for y in Self::span(rect.y, rect.bottom(), self.height) {
            for x in xs.clone() {
                self.blend(x, y, color);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside the bounds
    pub fn stroke_rect(&mut self, rect: Aabb, thickness: f32, color: Rgba) {
        let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0);
        self.fill_rect(Aabb::new(rect.x, rect.y, rect.w, t), color);
        self.fill_rect(Aabb::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.fill_rect(Aabb::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.fill_rect(
            Aabb::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t),
            color,
        );
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let bounds = Aabb::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        let r2 = radius * radius;
        let xs = Self::span(bounds.x, bounds.right(), self.width);
        for y in Self::span(bounds.y, bounds.bottom(), self.height) {
            for x in xs.clone() {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Nearest-neighbour scaled copy of `pixels` (`src_w` wide) into `dest`
    pub fn blit_scaled(&mut self, pixels: &[Rgba], src_w: u32, src_h: u32, dest: Aabb) {
        if src_w == 0 || src_h == 0 || dest.w <= 0.0 || dest.h <= 0.0 {
            return;
        }
        let xs = Self::span(dest.x, dest.right(), self.width);
        for y in Self::span(dest.y, dest.bottom(), self.height) {
            let v = ((y as f32 + 0.5 - dest.y) / dest.h * src_h as f32) as u32;
            for x in xs.clone() {
                let u = ((x as f32 + 0.5 - dest.x) / dest.w * src_w as f32) as u32;
                let src = (v.min(src_h - 1) * src_w + u.min(src_w - 1)) as usize;
                if let Some(color) = pixels.get(src) {
                    self.blend(x, y, *color);
                }
            }
        }
    }

    /// High-contrast post pass
    pub fn boost_contrast(&mut self) {
        for px in &mut self.pixels {
            *px = px.contrasted();
        }
    }

    /// Raw RGBA8 bytes, ready for upload or encoding
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(Aabb::new(-5.0, 8.0, 20.0, 20.0), colors::WHITE);
        assert_eq!(canvas.pixel(0, 8), Some(colors::WHITE));
        assert_eq!(canvas.pixel(9, 9), Some(colors::WHITE));
        assert_eq!(canvas.pixel(0, 7), Some(colors::BACKGROUND));
        assert_eq!(canvas.pixel(10, 9), None);
    }

    #[test]
    fn test_fully_offscreen_draws_nothing() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(Aabb::new(-80.0, 0.0, 40.0, 4.0), colors::WHITE);
        canvas.fill_circle(Vec2::new(100.0, 100.0), 5.0, colors::WHITE);
        assert!(canvas.as_bytes().chunks(4).all(|px| px == [5, 5, 13, 255]));
    }

    #[test]
    fn test_bytes_are_rgba() {
        let mut canvas = Canvas::new(3, 2);
        canvas.clear(Rgba::new(1, 2, 3));
        let bytes = canvas.as_bytes();
        assert_eq!(bytes.len(), 3 * 2 * 4);
        assert_eq!(&bytes[..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_alpha_blend() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear(Rgba::new(0, 0, 0));
        canvas.fill_rect(Aabb::new(0.0, 0.0, 1.0, 1.0), Rgba::new(255, 255, 255).with_alpha(0));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::new(0, 0, 0)));
        canvas.fill_rect(Aabb::new(0.0, 0.0, 1.0, 1.0), Rgba::new(255, 0, 0).with_alpha(255));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::new(255, 0, 0)));
    }

    #[test]
    fn test_stroke_leaves_interior() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_rect(Aabb::new(0.0, 0.0, 10.0, 10.0), 1.0, colors::OUTLINE);
        assert_eq!(canvas.pixel(0, 5), Some(colors::OUTLINE));
        assert_eq!(canvas.pixel(9, 9), Some(colors::OUTLINE));
        assert_eq!(canvas.pixel(5, 5), Some(colors::BACKGROUND));
    }

    #[test]
    fn test_blit_scales_up() {
        let mut canvas = Canvas::new(4, 4);
        let src = [colors::WHITE, colors::ENEMY, colors::SHIP, colors::OIL];
        canvas.blit_scaled(&src, 2, 2, Aabb::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(canvas.pixel(1, 1), Some(colors::WHITE));
        assert_eq!(canvas.pixel(3, 0), Some(colors::ENEMY));
        assert_eq!(canvas.pixel(0, 3), Some(colors::SHIP));
        assert_eq!(canvas.pixel(3, 3), Some(colors::OIL));
    }

    #[test]
    fn test_fit_resizes_only_on_change() {
        let mut canvas = Canvas::new(800, 600);
        canvas.clear(colors::WHITE);
        canvas.fit(Vec2::new(800.0, 600.0));
        assert_eq!(canvas.pixel(0, 0), Some(colors::WHITE));
        canvas.fit(Vec2::new(900.0, 600.0));
        assert_eq!(canvas.width(), 900);
        assert_eq!(canvas.pixel(0, 0), Some(colors::BACKGROUND));
    }
}
