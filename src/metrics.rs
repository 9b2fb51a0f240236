use crate::particle::Particle;
use crate::vecmath::Vec2;

/// Polarization order parameter: magnitude of the summed velocity vectors,
/// normalized by what perfect alignment would produce. 1 means everyone
/// moves the same way, 0 total cancellation. Computed on demand, never
/// cached. An empty generation reports 0.
pub fn polarization(particles: &[Particle]) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }
    let mut sum = Vec2::zero();
    for p in particles {
        sum = sum + p.velocity();
    }
    // Speed is uniform across a run, so the first particle's is the run's.
    sum.length() / (particles.len() as f64 * particles[0].speed)
}

/// Mean of the second half of a per-iteration polarization series, the
/// scalar a sweep reports per swept value. The first half covers the
/// transient before the order parameter settles.
pub fn stationary_mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let tail = &series[series.len() / 2..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn swarm(headings: &[f64]) -> Vec<Particle> {
        headings
            .iter()
            .enumerate()
            .map(|(id, &h)| Particle::new(id as u32, Vec2::new(1.0, 1.0), h, 0.03))
            .collect()
    }

    #[test]
    fn aligned_swarm_is_fully_polarized() {
        let particles = swarm(&[0.7; 40]);
        assert!((polarization(&particles) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opposing_headings_cancel() {
        let particles = swarm(&[0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]);
        assert!(polarization(&particles) < 1e-9);
    }

    #[test]
    fn polarization_is_bounded() {
        let mut rng = StdRng::seed_from_u64(17);
        let particles = crate::particle::sample_generation(500, 5.0, 0.03, &mut rng);
        let phi = polarization(&particles);
        assert!((0.0..=1.0 + 1e-12).contains(&phi));
    }

    #[test]
    fn empty_generation_reports_zero() {
        assert_eq!(polarization(&[]), 0.0);
    }

    #[test]
    fn stationary_mean_uses_the_second_half() {
        assert_eq!(stationary_mean(&[0.0, 0.0, 1.0, 1.0]), 1.0);
        assert_eq!(stationary_mean(&[0.0, 2.0, 4.0]), 3.0);
        assert_eq!(stationary_mean(&[5.0]), 5.0);
        assert_eq!(stationary_mean(&[]), 0.0);
    }
}
