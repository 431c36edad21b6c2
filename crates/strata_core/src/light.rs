use strata_math::{Colour, Vec3};

/// Point light with separate ambient, diffuse and specular contributions.
///
/// Has no extent, so shadows are hard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Colour,
    pub diffuse: Colour,
    pub specular: Colour,
}

impl PointLight {
    pub fn new(position: Vec3, ambient: Colour, diffuse: Colour, specular: Colour) -> Self {
        Self {
            position,
            ambient,
            diffuse,
            specular,
        }
    }

    /// Light contributing only ambient illumination.
    pub fn ambient_only(position: Vec3, ambient: Colour) -> Self {
        Self::new(position, ambient, Colour::BLACK, Colour::BLACK)
    }

    /// Unit vector from `point` toward the light.
    pub fn direction_from(&self, point: Vec3) -> Vec3 {
        (self.position - point).normalize_or_zero()
    }
}
