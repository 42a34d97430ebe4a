//! Linear RGB colors and their 8-bit pixel form.
//!
//! Shading works on [`Color`], an unbounded `f32` triple. Values are only
//! clamped to `[0, 1]` when a pixel is finally written, so accumulated light
//! may exceed 1 while the recursion is still running.

use std::ops::{Add, AddAssign, Mul};

/// Clamps a color channel into `[0, 1]`.
#[inline]
pub fn clamp(value: f32) -> f32 {
    if value < 0.0 {
        0.0
    } else if value > 1.0 {
        1.0
    } else {
        value
    }
}

/// A floating point RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_array(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Returns a copy with every channel clamped to `[0, 1]`.
    pub fn clamped(&self) -> Self {
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b))
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Converts to 8-bit channels: clamp, scale by 255, truncate.
    pub fn to_rgb8(&self) -> Rgb8 {
        let c = self.clamped();
        Rgb8::new(
            (c.r * 255.0) as u8,
            (c.g * 255.0) as u8,
            (c.b * 255.0) as u8,
        )
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Self::Output {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Scales every channel.
impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Self::Output {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// Component-wise (Hadamard) product, e.g. material color times light color.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

/// An 8-bit RGB pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
