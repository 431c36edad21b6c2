//! Surface description for Phong-style local illumination.

use std::sync::Arc;

use strata_math::{Colour, Vec2, Vec3};

use crate::Texture;

/// Fixed-shape material record.
///
/// `reflectivity` and `refractive_index` are independent optional features:
/// `None` means the surface does not spawn that kind of secondary ray.
#[derive(Clone, Debug)]
pub struct Material {
    /// Ambient intensity
    pub ka: f32,
    /// Diffuse intensity
    pub kd: f32,
    /// Specular intensity
    pub ks: f32,
    /// Specular exponent
    pub shininess: f32,
    /// Fraction of light reflected (0 = none, 1 = mirror)
    pub reflectivity: Option<f32>,
    /// Index of refraction of the medium behind the surface
    pub refractive_index: Option<f32>,
    pub colour: Colour,
    pub texture: Option<Arc<dyn Texture>>,
}

impl Default for Material {
    /// Mid-grey, mostly diffuse, no secondary rays.
    fn default() -> Self {
        Self {
            ka: 0.2,
            kd: 0.8,
            ks: 0.0,
            shininess: 1.0,
            reflectivity: None,
            refractive_index: None,
            colour: Colour::splat(0.5),
            texture: None,
        }
    }
}

impl Material {
    /// Create a material with the given base colour and default intensities.
    pub fn new(colour: Colour) -> Self {
        Self {
            colour,
            ..Default::default()
        }
    }

    /// Set ambient, diffuse and specular intensities and the specular exponent.
    pub fn with_intensities(mut self, ka: f32, kd: f32, ks: f32, shininess: f32) -> Self {
        self.ka = ka;
        self.kd = kd;
        self.ks = ks;
        self.shininess = shininess;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = Some(reflectivity.clamp(0.0, 1.0));
        self
    }

    pub fn with_refractive_index(mut self, index: f32) -> Self {
        self.refractive_index = Some(index);
        self
    }

    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// True when hits on this surface spawn reflection or refraction rays.
    pub fn has_secondary_rays(&self) -> bool {
        self.reflectivity.is_some() || self.refractive_index.is_some()
    }

    /// Base colour at a hit: the texture if there is one, else the flat colour.
    pub fn surface_colour(&self, tex_coord: Vec2, point: Vec3) -> Colour {
        match &self.texture {
            Some(texture) => texture.texel(tex_coord, point),
            None => self.colour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Image, ImageTexture};

    #[test]
    fn test_builder() {
        let material = Material::new(Colour::new(0.8, 0.2, 0.2))
            .with_intensities(0.5, 1.2, 0.5, 20.0)
            .with_reflectivity(1.5)
            .with_refractive_index(1.6666);

        assert_eq!(material.kd, 1.2);
        assert_eq!(material.reflectivity, Some(1.0));
        assert_eq!(material.refractive_index, Some(1.6666));
        assert!(material.has_secondary_rays());
        assert!(!Material::default().has_secondary_rays());
    }

    #[test]
    fn test_surface_colour_prefers_texture() {
        let flat = Material::new(Colour::new(0.1, 0.2, 0.3));
        assert_eq!(flat.surface_colour(Vec2::ZERO, Vec3::ZERO), Colour::new(0.1, 0.2, 0.3));

        let image = Arc::new(Image::new(1, 1, Colour::WHITE));
        let textured = flat.with_texture(Arc::new(ImageTexture::new(image)));
        assert_eq!(textured.surface_colour(Vec2::new(0.3, 0.7), Vec3::ZERO), Colour::WHITE);
    }
}
