//! Basic geometry and color primitives shared by the launcher core
//!
//! Everything here is in logical screen pixels with the origin at the top-left
//! corner, Y growing downwards (so a panel offset of 0 means "at the top").

use serde::{Deserialize, Serialize};

/// A position on the home screen surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same point shifted vertically
    pub fn offset_y(self, dy: f64) -> Self {
        Self { x: self.x, y: self.y + dy }
    }
}

/// A simple rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width &&
        y >= self.y && y < self.y + self.height
    }
}

/// Color in RGBA format (0.0 - 1.0)
pub type Color = [f32; 4];

/// Convert 8-bit channels into a [`Color`]
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Colors used for system chrome
pub mod colors {
    use super::Color;

    pub const TRANSPARENT: Color = [0.0, 0.0, 0.0, 0.0];
    pub const SEMITRANSPARENT_NAVIGATION: Color = [0.0, 0.0, 0.0, 0.4]; // #66000000
}

/// Easing functions for animations
pub mod easing {
    /// Decelerate - starts fast, slows down (quadratic ease out)
    pub fn decelerate(t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        1.0 - (1.0 - t) * (1.0 - t)
    }
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
