//! Software rendering module
//!
//! Every game draws into an RGBA8 `Canvas`; the host uploads `as_bytes()`
//! to whatever surface it has (a 2D canvas `ImageData`, a PNG, a texture).

pub mod canvas;
pub mod scenes;
pub mod sprites;

pub use canvas::{Canvas, Rgba, colors};
pub use scenes::Scene;
pub use sprites::{Sprite, SpriteId, SpriteSheet};
