use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The inverse direction and per-axis direction signs are derived from
/// `direction` and cached for AABB slab tests. Fields are private so the
/// cached state can only change together with the direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inverse_direction: Vec3,
    signs: [usize; 3],
}

impl Ray {
    /// Create a new ray.
    ///
    /// `direction` need not be unit length. Zero components are allowed and
    /// produce infinite inverse components.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let (inverse_direction, signs) = Self::derive(direction);
        Self {
            origin,
            direction,
            inverse_direction,
            signs,
        }
    }

    fn derive(direction: Vec3) -> (Vec3, [usize; 3]) {
        let inverse = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        // Sign of the inverse, so that -0.0 selects the same bound as its infinity
        let signs = [
            (inverse.x < 0.0) as usize,
            (inverse.y < 0.0) as usize,
            (inverse.z < 0.0) as usize,
        ];
        (inverse, signs)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Componentwise reciprocal of the direction.
    #[inline]
    pub fn inverse_direction(&self) -> Vec3 {
        self.inverse_direction
    }

    /// 0 where the direction component is non-negative, 1 otherwise.
    #[inline]
    pub fn direction_signs(&self) -> [usize; 3] {
        self.signs
    }

    /// Replace the direction, re-deriving the cached inverse and signs.
    pub fn set_direction(&mut self, direction: Vec3) {
        let (inverse_direction, signs) = Self::derive(direction);
        self.direction = direction;
        self.inverse_direction = inverse_direction;
        self.signs = signs;
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
