use std::ops::{Add, Mul};

/// A simple 2D vector over f64.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
    #[inline(always)]
    pub fn zero() -> Self { Self::new(0.0, 0.0) }
    #[inline(always)]
    pub fn length_squared(self) -> f64 { self.x * self.x + self.y * self.y }
    #[inline(always)]
    pub fn length(self) -> f64 { self.length_squared().sqrt() }
    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self { Self::new(self.x * scalar, self.y * scalar) }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        self.scale(scalar)
    }
}

/// Converts a heading angle (radians) to a unit vector.
#[inline(always)]
pub fn angle_to_vec(theta: f64) -> Vec2 { Vec2::new(theta.cos(), theta.sin()) }

/// Converts a vector to a heading angle (radians), quadrant-correct.
#[inline(always)]
pub fn vec_to_angle(v: Vec2) -> f64 { v.y.atan2(v.x) }

/// Maps a scalar separation onto the nearest periodic image for a domain of
/// side `l`. The result lies in [-l/2, l/2].
#[inline(always)]
pub fn min_image(delta: f64, l: f64) -> f64 {
    delta - (delta / l).round() * l
}

/// Squared distance between two points on the `l`-periodic torus.
#[inline(always)]
pub fn torus_distance_sq(a: Vec2, b: Vec2, l: f64) -> f64 {
    let dx = min_image(a.x - b.x, l);
    let dy = min_image(a.y - b.y, l);
    dx * dx + dy * dy
}

/// Wraps a coordinate into [0, l). The `>= l` guard catches the case where
/// adding `l` to a tiny negative remainder rounds back to exactly `l`.
#[inline(always)]
pub fn wrap(value: f64, l: f64) -> f64 {
    let mut r = value % l;
    if r < 0.0 {
        r += l;
    }
    if r >= l {
        r -= l;
    }
    r
}
