//! Textures sampled by materials at hit points.
//!
//! Textures hold shared references to images owned by the
//! [`ResourceManager`](crate::ResourceManager); they never own pixel data.

use std::fmt;
use std::sync::Arc;

use strata_math::{Colour, Interval, Vec2, Vec3};

use crate::Image;

/// Anything that can produce a colour for a surface point.
pub trait Texture: Send + Sync {
    /// Colour at texture coordinate `tex_coord` of world-space `point`.
    fn texel(&self, tex_coord: Vec2, point: Vec3) -> Colour;
}

impl fmt::Debug for dyn Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<texture>")
    }
}

/// Map a texture coordinate component into pixel space, wrapping by modulo.
#[inline]
fn wrap(coord: f32, size: u32) -> u32 {
    ((coord * size as f32).floor() as i64).rem_euclid(size as i64) as u32
}

fn nearest(image: &Image, tex_coord: Vec2) -> Colour {
    let x = wrap(tex_coord.x, image.width());
    let y = wrap(tex_coord.y, image.height());
    image.get(x, y).unwrap_or(Colour::BLACK)
}

/// Nearest-texel lookup into a single image.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    image: Arc<Image>,
}

impl ImageTexture {
    pub fn new(image: Arc<Image>) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl Texture for ImageTexture {
    fn texel(&self, tex_coord: Vec2, _point: Vec3) -> Colour {
        nearest(&self.image, tex_coord)
    }
}

/// Number of layers blended by [`TerrainHeightTexture`].
pub const TERRAIN_LAYERS: usize = 4;

/// Height (normalised) at which each terrain layer peaks.
const LAYER_CENTRES: [f32; TERRAIN_LAYERS] = [0.0, 0.3, 0.6, 0.9];
/// Half-width of each layer's triangular falloff.
const LAYER_WIDTHS: [f32; TERRAIN_LAYERS] = [0.2, 0.25, 0.25, 0.25];

/// Blend of four images (low to very high) weighted by the height of the
/// sampled point within `height_range`.
#[derive(Clone, Debug)]
pub struct TerrainHeightTexture {
    layers: [Arc<Image>; TERRAIN_LAYERS],
    height_range: Interval,
}

impl TerrainHeightTexture {
    /// `layers` are ordered from lowest to highest ground.
    pub fn new(layers: [Arc<Image>; TERRAIN_LAYERS], height_range: Interval) -> Self {
        Self {
            layers,
            height_range,
        }
    }

    /// Layer weights for a normalised height, summing to one.
    pub fn weights(height: f32) -> [f32; TERRAIN_LAYERS] {
        let mut weights = [0.0; TERRAIN_LAYERS];
        for (i, weight) in weights.iter_mut().enumerate() {
            *weight = (1.0 - (height - LAYER_CENTRES[i]).abs() / LAYER_WIDTHS[i]).clamp(0.0, 1.0);
        }
        let total: f32 = weights.iter().sum();
        if total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
        } else {
            // Between peaks every layer contributes evenly
            weights = [1.0 / TERRAIN_LAYERS as f32; TERRAIN_LAYERS];
        }
        weights
    }
}

impl Texture for TerrainHeightTexture {
    fn texel(&self, tex_coord: Vec2, point: Vec3) -> Colour {
        let range = self.height_range.size();
        let height = if range > 0.0 {
            (self.height_range.clamp(point.y) - self.height_range.min) / range
        } else {
            0.0
        };

        Self::weights(height)
            .iter()
            .zip(&self.layers)
            .map(|(weight, image)| nearest(image, tex_coord) * *weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Arc<Image> {
        let mut image = Image::new(2, 2, Colour::BLACK);
        image.set(1, 0, Colour::WHITE);
        image.set(0, 1, Colour::WHITE);
        Arc::new(image)
    }

    #[test]
    fn test_image_texture_lookup() {
        let texture = ImageTexture::new(checker());

        assert_eq!(texture.texel(Vec2::new(0.1, 0.1), Vec3::ZERO), Colour::BLACK);
        assert_eq!(texture.texel(Vec2::new(0.6, 0.1), Vec3::ZERO), Colour::WHITE);
        assert_eq!(texture.texel(Vec2::new(0.1, 0.6), Vec3::ZERO), Colour::WHITE);
    }

    #[test]
    fn test_texture_coordinates_wrap() {
        let texture = ImageTexture::new(checker());

        assert_eq!(
            texture.texel(Vec2::new(1.6, 0.1), Vec3::ZERO),
            texture.texel(Vec2::new(0.6, 0.1), Vec3::ZERO)
        );
        assert_eq!(
            texture.texel(Vec2::new(-0.4, 0.1), Vec3::ZERO),
            texture.texel(Vec2::new(0.6, 0.1), Vec3::ZERO)
        );
        assert_eq!(texture.texel(Vec2::new(1.0, 1.0), Vec3::ZERO), Colour::BLACK);
    }

    #[test]
    fn test_terrain_weights_sum_to_one() {
        for step in 0..=20 {
            let weights = TerrainHeightTexture::weights(step as f32 / 20.0);
            let total: f32 = weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-5, "height {step}: {weights:?}");
        }
        assert_eq!(TerrainHeightTexture::weights(0.0)[0], 1.0);
        assert_eq!(TerrainHeightTexture::weights(0.9)[3], 1.0);
    }

    #[test]
    fn test_terrain_texture_blends_by_height() {
        let flat = |c: Colour| Arc::new(Image::new(1, 1, c));
        let texture = TerrainHeightTexture::new(
            [
                flat(Colour::new(1.0, 0.0, 0.0)),
                flat(Colour::new(0.0, 1.0, 0.0)),
                flat(Colour::new(0.0, 0.0, 1.0)),
                flat(Colour::WHITE),
            ],
            Interval::new(0.0, 100.0),
        );

        let low = texture.texel(Vec2::ZERO, Vec3::new(0.0, 0.0, 0.0));
        let peak = texture.texel(Vec2::ZERO, Vec3::new(0.0, 90.0, 0.0));

        assert_eq!(low, Colour::new(1.0, 0.0, 0.0));
        assert_eq!(peak, Colour::WHITE);
    }
}
