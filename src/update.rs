use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::neighbors::NeighborMap;
use crate::particle::Particle;
use crate::sim_params::SimParams;
use crate::vecmath::{angle_to_vec, vec_to_angle, wrap, Vec2};

/// How a particle picks its next heading from its neighborhood.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentRule {
    /// Circular mean over the particle itself and its neighbors.
    CircularMean,
    /// Copy the heading of one uniformly chosen neighbor; keep the current
    /// heading when there are none.
    RandomNeighbor,
}

/// Builds the next generation from the current one and its neighbor
/// relation. Sequential on purpose: particles consume draws from the one
/// shared generator in id order, which keeps runs reproducible for a seed.
///
/// Noise is added after either alignment rule, a uniform draw from
/// [-noise/2, +noise/2). Displacement follows the heading the particle
/// entered the step with; the realigned heading takes effect next step.
pub fn advance(
    particles: &[Particle],
    neighbors: &NeighborMap,
    params: &SimParams,
    rule: AlignmentRule,
    rng: &mut StdRng,
) -> Vec<Particle> {
    let l = params.side_length;
    let nu = params.noise_amplitude;
    let dt = params.time_step;

    particles
        .iter()
        .map(|p| {
            let aligned = match rule {
                AlignmentRule::CircularMean => circular_mean_heading(p, neighbors, particles),
                AlignmentRule::RandomNeighbor => {
                    let list = neighbors.neighbors_of(p.id);
                    if list.is_empty() {
                        p.heading
                    } else {
                        let pick = list[rng.random_range(0..list.len())];
                        particles[pick as usize].heading
                    }
                }
            };
            // The draw happens even for zero amplitude, so the generator
            // stream lines up across runs that differ only in noise.
            let heading = aligned + rng.random_range(-0.5..0.5) * nu;

            let step = angle_to_vec(p.heading).scale(p.speed * dt);
            let position = Vec2::new(
                wrap(p.position.x + step.x, l),
                wrap(p.position.y + step.y, l),
            );

            Particle::new(p.id, position, heading, p.speed)
        })
        .collect()
}

/// Circular mean over the particle itself and its neighbors. Seeding the
/// sums with the particle's own heading means the averaged set is never
/// empty, whatever the neighbor relation says.
fn circular_mean_heading(p: &Particle, neighbors: &NeighborMap, particles: &[Particle]) -> f64 {
    let mut sin_sum = p.heading.sin();
    let mut cos_sum = p.heading.cos();
    let mut count = 1.0;
    for &id in neighbors.neighbors_of(p.id) {
        let heading = particles[id as usize].heading;
        sin_sum += heading.sin();
        cos_sum += heading.cos();
        count += 1.0;
    }
    vec_to_angle(Vec2::new(cos_sum / count, sin_sum / count))
}
