//! 2D vector math used by the simulation

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector (serialized as `{"x": .., "y": ..}`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Heading of `v` in `[-π, π]`.
    ///
    /// A vector lying on the x axis has a zero sign and therefore maps to 0,
    /// including `(-x, 0)`.
    pub fn to_angle(v: Vector2) -> f32 {
        (v.x / v.length()).acos() * sign(v.y)
    }

    /// Unsigned angle between two vectors, in `[0, π]`
    pub fn angle(v1: Vector2, v2: Vector2) -> f32 {
        // Rounding can push (anti)parallel cosines just past ±1
        (v1.dot(v2) / (v1.length() * v2.length()))
            .clamp(-1.0, 1.0)
            .acos()
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Clamp each axis into `[0, max.axis]` in place
    pub fn clamp(&mut self, max: Vector2) {
        self.x = self.x.max(0.0).min(max.x);
        self.y = self.y.max(0.0).min(max.y);
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn add(&self, other: Vector2) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: Vector2) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, n: f32) -> Self {
        Self::new(self.x * n, self.y * n)
    }

    pub fn divide(&self, n: f32) -> Self {
        Self::new(self.x / n, self.y / n)
    }

    pub fn inverted(&self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// Unit vector with the same direction. NaN for a zero vector.
    pub fn normalized(&self) -> Self {
        self.divide(self.length())
    }

    /// Same length, heading turned by `angle`
    pub fn rotate(&self, angle: f32) -> Self {
        Self::from_angle(Self::to_angle(*self) + angle).multiply(self.length())
    }

    pub fn distance(&self, other: Vector2) -> f32 {
        self.subtract(other).length()
    }
}

/// Sign with `sign(0) == 0`, unlike `f32::signum`
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::add(&self, rhs)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        self.subtract(rhs)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f32) -> Vector2 {
        self.multiply(rhs)
    }
}

impl Div<f32> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f32) -> Vector2 {
        self.divide(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        self.inverted()
    }
}
