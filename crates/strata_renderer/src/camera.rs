//! Camera for ray generation.

use strata_math::{Ray, Vec3};

/// Viewing rectangle in camera space, in the same units as the distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Rect {
    pub const fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Rectangle centred on the view axis.
    pub const fn centred(half_width: f32, half_height: f32) -> Self {
        Self::new(-half_width, half_width, -half_height, half_height)
    }
}

/// Maps normalized pixel coordinates to world-space rays.
///
/// The camera looks down `-w`; `u` points right and `v` up. Pixel
/// coordinates run from (0, 0) at the bottom-left of the viewing rectangle
/// to (1, 1) at its top-right.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    rect: Rect,
    distance: f32,
    orthographic: bool,

    // Cached computed values (set by update())
    corner: Vec3,
    across: Vec3,
    up: Vec3,
}

impl Camera {
    /// Create a perspective camera at `position` looking along `direction`.
    ///
    /// # Panics
    /// If `direction` is zero.
    pub fn new(position: Vec3, direction: Vec3, up: Vec3, rect: Rect, distance: f32) -> Self {
        let mut camera = Self {
            position,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            rect,
            distance,
            orthographic: false,
            corner: Vec3::ZERO,
            across: Vec3::ZERO,
            up: Vec3::ZERO,
        };
        camera.set_view(direction, up);
        camera
    }

    /// Set projection mode.
    pub fn with_orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    pub fn set_orthographic(&mut self, orthographic: bool) {
        self.orthographic = orthographic;
    }

    pub fn is_orthographic(&self) -> bool {
        self.orthographic
    }

    /// Rebuild the basis from a look direction and an up hint.
    ///
    /// An up hint parallel to the direction is replaced by an arbitrary
    /// perpendicular vector.
    pub fn set_view(&mut self, direction: Vec3, up: Vec3) {
        assert!(
            direction.length_squared() > 0.0,
            "camera direction must be non-zero"
        );
        self.w = -direction.normalize();
        self.u = up
            .cross(self.w)
            .try_normalize()
            .unwrap_or_else(|| self.w.any_orthonormal_vector());
        self.v = self.w.cross(self.u);
        self.update();
    }

    fn update(&mut self) {
        self.across = (self.rect.right - self.rect.left) * self.u;
        self.up = (self.rect.top - self.rect.bottom) * self.v;
        self.corner = self.position + self.rect.left * self.u + self.rect.bottom * self.v
            - self.distance * self.w;
    }

    /// Point on the viewing rectangle for normalized coordinates (x, y).
    pub fn target(&self, x: f32, y: f32) -> Vec3 {
        self.corner + self.across * x + self.up * y
    }

    /// Generate the ray through normalized pixel coordinates (x, y).
    pub fn ray_to_pixel(&self, x: f32, y: f32) -> Ray {
        let target = self.target(x, y);
        if self.orthographic {
            Ray::new(target, -self.w)
        } else {
            Ray::new(self.position, (target - self.position).normalize())
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Right-pointing basis vector.
    pub fn u(&self) -> Vec3 {
        self.u
    }

    /// Up-pointing basis vector.
    pub fn v(&self) -> Vec3 {
        self.v
    }

    /// Backward-pointing basis vector (the camera looks down `-w`).
    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            Rect::centred(1.0, 1.0),
            1.0,
        )
    }
}
