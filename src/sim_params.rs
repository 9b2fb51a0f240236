/// Runtime parameters derived from the configuration, used on every step.
/// Owned by the simulation driver; only the explicit reset operations and
/// parameter setters change them after construction.
#[derive(Debug, Copy, Clone)]
pub struct SimParams {
    // Domain & grid
    pub side_length: f64,
    pub interaction_radius: f64,
    pub interaction_radius_sq: f64,
    /// Cells per axis: floor(side_length / interaction_radius), at least 1.
    pub grid_dim: u32,
    /// side_length / grid_dim, always >= interaction_radius.
    pub cell_size: f64,

    // Population
    pub n: u32,
    pub speed: f64,
    pub density: f64,

    // Stepping
    pub time_step: f64,
    pub max_iterations: u32,
    pub noise_amplitude: f64,
}

impl SimParams {
    /// Recomputes the particle count and the derived density. The grid layout
    /// depends only on the domain and radius, so it is left untouched.
    pub fn set_count(&mut self, n: u32) {
        self.n = n;
        self.density = n as f64 / (self.side_length * self.side_length);
    }
}

/// Cells per axis for a given domain and interaction radius. A radius larger
/// than the domain collapses the grid to a single cell.
pub fn grid_dim_for(side_length: f64, interaction_radius: f64) -> u32 {
    ((side_length / interaction_radius).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dim_floors_and_clamps() {
        assert_eq!(grid_dim_for(5.0, 1.0), 5);
        assert_eq!(grid_dim_for(5.0, 1.1), 4);
        // Radius wider than the domain: one cell covering everything.
        assert_eq!(grid_dim_for(5.0, 7.0), 1);
    }

    #[test]
    fn set_count_tracks_density() {
        let mut params = SimParams {
            side_length: 5.0,
            interaction_radius: 1.0,
            interaction_radius_sq: 1.0,
            grid_dim: 5,
            cell_size: 1.0,
            n: 100,
            speed: 0.03,
            density: 4.0,
            time_step: 1.0,
            max_iterations: 10,
            noise_amplitude: 0.1,
        };
        params.set_count(250);
        assert_eq!(params.n, 250);
        assert!((params.density - 10.0).abs() < 1e-12);
    }
}
