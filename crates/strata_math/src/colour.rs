use std::ops::{Add, AddAssign, Div, Mul, Sub};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Linear RGB colour.
///
/// Components are not clamped while light is accumulated; call `clamp`
/// before writing to an 8-bit target.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Saturate every component to [0, 1]. NaN becomes 0.
    pub fn clamp(self) -> Self {
        let saturate = |c: f32| if c > 0.0 { c.min(1.0) } else { 0.0 };
        Self::new(saturate(self.r), saturate(self.g), saturate(self.b))
    }

    /// Raise every component to `1 / gamma`.
    pub fn gamma(self, gamma: f32) -> Self {
        let power = 1.0 / gamma;
        let encode = |c: f32| if c > 0.0 { c.powf(power) } else { 0.0 };
        Self::new(encode(self.r), encode(self.g), encode(self.b))
    }

    /// Clamp and quantise to 8-bit RGB.
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamp();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        Colour::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Colour {
    fn add_assign(&mut self, rhs: Colour) {
        *self = *self + rhs;
    }
}

impl Sub for Colour {
    type Output = Colour;

    fn sub(self, rhs: Colour) -> Colour {
        Colour::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

/// Componentwise product (light × surface).
impl Mul for Colour {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Colour {
    type Output = Colour;

    fn mul(self, rhs: f32) -> Colour {
        Colour::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<Colour> for f32 {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        rhs * self
    }
}

impl Div<f32> for Colour {
    type Output = Colour;

    fn div(self, rhs: f32) -> Colour {
        Colour::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

impl std::iter::Sum for Colour {
    fn sum<I: Iterator<Item = Colour>>(iter: I) -> Colour {
        iter.fold(Colour::BLACK, Add::add)
    }
}
