use std::f64::consts::PI;

use rand::prelude::*;

use crate::vecmath::{angle_to_vec, Vec2};

/// A single self-propelled particle. Generations are immutable: each step
/// builds a complete replacement `Vec<Particle>` instead of mutating in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Index of the particle within its generation, stable across steps.
    pub id: u32,
    pub position: Vec2,
    /// Heading angle in radians, not normalized to any interval.
    pub heading: f64,
    pub speed: f64,
}

impl Particle {
    pub fn new(id: u32, position: Vec2, heading: f64, speed: f64) -> Self {
        Self { id, position, heading, speed }
    }

    /// Velocity vector implied by heading and speed.
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        angle_to_vec(self.heading).scale(self.speed)
    }
}

/// Samples a fresh generation: positions uniform over the `[0, L)^2` domain,
/// headings uniform over the circle, ids dense in `[0, n)`.
pub fn sample_generation(n: u32, side_length: f64, speed: f64, rng: &mut StdRng) -> Vec<Particle> {
    (0..n)
        .map(|id| {
            let position = Vec2::new(
                rng.random_range(0.0..side_length),
                rng.random_range(0.0..side_length),
            );
            let heading = rng.random_range(-PI..PI);
            Particle::new(id, position, heading, speed)
        })
        .collect()
}
