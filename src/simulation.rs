use std::time::Instant;

use log::{debug, info};
use rand::prelude::*;

use crate::config::{ConfigError, SimulationConfig};
use crate::metrics::{polarization, stationary_mean};
use crate::neighbors::{find_neighbors, NeighborStrategy};
use crate::particle::{sample_generation, Particle};
use crate::sim_params::SimParams;
use crate::update::{advance, AlignmentRule};

// Wall-clock seconds between progress lines in the run loops.
const PROGRESS_INTERVAL_SECS: f64 = 5.0;

/// One recorded animation step: the generation after `iteration` steps and
/// its polarization.
#[derive(Debug, Clone)]
pub struct Frame {
    pub iteration: u32,
    pub particles: Vec<Particle>,
    pub polarization: f64,
}

/// Result of one noise amplitude in a polarization sweep.
#[derive(Debug, Clone)]
pub struct NoiseSweepPoint {
    pub noise_amplitude: f64,
    /// Stationary mean of `series`.
    pub polarization: f64,
    /// Polarization after each iteration of the run.
    pub series: Vec<f64>,
}

/// Result of one particle count in a density sweep.
#[derive(Debug, Clone)]
pub struct DensitySweepPoint {
    pub count: u32,
    pub density: f64,
    pub polarization: f64,
    pub series: Vec<f64>,
}

/// The simulation driver. Owns the runtime parameters, the current
/// generation, the snapshot of the initial one, and the one seeded generator
/// every random draw in the engine goes through.
pub struct Simulation {
    config: SimulationConfig,
    params: SimParams,
    strategy: NeighborStrategy,
    alignment: AlignmentRule,
    particles: Vec<Particle>,
    initial_snapshot: Vec<Particle>,
    rng: StdRng,
    current_iteration: u32,
}

impl Simulation {
    /// Validates the configuration and builds the driver ready to run: a
    /// sampled initial generation, its snapshot, and the seeded generator.
    /// This is the only fallible operation; everything after construction
    /// is pure computation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let params = config.sim_params()?;
        let mut rng = StdRng::seed_from_u64(config.experiment.seed);

        let particles = sample_generation(params.n, params.side_length, params.speed, &mut rng);
        let initial_snapshot = particles.clone();

        info!(
            "Initialized simulation: n={}, L={}, r={}, grid={}x{}, density={:.3}, seed={}",
            params.n,
            params.side_length,
            params.interaction_radius,
            params.grid_dim,
            params.grid_dim,
            params.density,
            config.experiment.seed
        );

        Ok(Simulation {
            strategy: config.experiment.strategy,
            alignment: config.experiment.alignment,
            config,
            params,
            particles,
            initial_snapshot,
            rng,
            current_iteration: 0,
        })
    }

    /// Advances one step: resolve the neighbor relation with the selected
    /// strategy, realign and move every particle, bump the counter.
    pub fn step(&mut self) {
        let neighbors = find_neighbors(&self.particles, &self.params, self.strategy);
        self.particles = advance(
            &self.particles,
            &neighbors,
            &self.params,
            self.alignment,
            &mut self.rng,
        );
        self.current_iteration += 1;
    }

    /// Restores the initial generation bit for bit and rewinds the iteration
    /// counter. The generator keeps its position in its stream.
    pub fn reset_to_snapshot(&mut self) {
        self.particles = self.initial_snapshot.clone();
        self.current_iteration = 0;
    }

    /// Samples a fresh initial generation from the owned generator and makes
    /// it the new snapshot.
    pub fn regenerate(&mut self) {
        self.particles = sample_generation(
            self.params.n,
            self.params.side_length,
            self.params.speed,
            &mut self.rng,
        );
        self.initial_snapshot = self.particles.clone();
        self.current_iteration = 0;
    }

    /// Re-dimensions the population. The same count restores the snapshot,
    /// so a repeated sweep point reuses identical initial conditions; a new
    /// count recomputes the density and regenerates from scratch.
    pub fn reset_variables(&mut self, new_n: u32) {
        if new_n == self.params.n {
            self.reset_to_snapshot();
        } else {
            self.params.set_count(new_n);
            self.regenerate();
        }
    }

    pub fn set_noise_amplitude(&mut self, noise_amplitude: f64) {
        self.params.noise_amplitude = noise_amplitude;
    }

    pub fn set_strategy(&mut self, strategy: NeighborStrategy) {
        self.strategy = strategy;
    }

    pub fn set_alignment_rule(&mut self, rule: AlignmentRule) {
        self.alignment = rule;
    }

    /// Runs `max_iterations` steps from the snapshot, recording every
    /// generation including the initial one.
    pub fn run_for_animation(&mut self) -> Vec<Frame> {
        self.reset_to_snapshot();
        info!(
            "Running animation: {} iterations, strategy {:?}",
            self.params.max_iterations, self.strategy
        );

        let total = self.params.max_iterations;
        let start_time = Instant::now();
        let mut previous_print = start_time;

        let mut frames = Vec::with_capacity(total as usize + 1);
        frames.push(self.frame());
        for step in 0..total {
            self.step();
            let frame = self.frame();
            let phi = frame.polarization;
            frames.push(frame);

            let now = Instant::now();
            if now.duration_since(previous_print).as_secs_f64() >= PROGRESS_INTERVAL_SECS {
                info!(
                    "Step [{}/{}] | polarization {:.6} | elapsed {:.2} s",
                    step + 1,
                    total,
                    phi,
                    start_time.elapsed().as_secs_f64()
                );
                previous_print = now;
            }
        }
        frames
    }

    /// Runs one full simulation per noise amplitude, always from the same
    /// snapshot, condensing each run's polarization series to its stationary
    /// mean. The configured amplitude is restored afterwards.
    pub fn run_for_polarization_sweep(&mut self, noise_values: &[f64]) -> Vec<NoiseSweepPoint> {
        info!("Running polarization sweep over {} noise values", noise_values.len());
        let configured = self.params.noise_amplitude;
        let mut points = Vec::with_capacity(noise_values.len());

        for &nu in noise_values {
            self.reset_to_snapshot();
            self.set_noise_amplitude(nu);
            let series = self.run_recording_polarization();
            let mean = stationary_mean(&series);
            debug!("Noise sweep point: nu={:.3}, polarization={:.6}", nu, mean);
            points.push(NoiseSweepPoint { noise_amplitude: nu, polarization: mean, series });
        }

        self.set_noise_amplitude(configured);
        points
    }

    /// Runs one full simulation per particle count. A count equal to the
    /// current population reuses the snapshot, any other regenerates. The
    /// driver is left at the last swept count.
    pub fn run_for_density_sweep(&mut self, counts: &[u32]) -> Vec<DensitySweepPoint> {
        info!("Running density sweep over {} particle counts", counts.len());
        let mut points = Vec::with_capacity(counts.len());

        for &count in counts {
            self.reset_variables(count);
            let series = self.run_recording_polarization();
            let mean = stationary_mean(&series);
            debug!(
                "Density sweep point: n={}, density={:.3}, polarization={:.6}",
                count, self.params.density, mean
            );
            points.push(DensitySweepPoint {
                count,
                density: self.params.density,
                polarization: mean,
                series,
            });
        }
        points
    }

    fn run_recording_polarization(&mut self) -> Vec<f64> {
        let total = self.params.max_iterations;
        let start_time = Instant::now();
        let mut previous_print = start_time;

        let mut series = Vec::with_capacity(total as usize);
        for step in 0..total {
            self.step();
            let phi = polarization(&self.particles);
            series.push(phi);

            let now = Instant::now();
            if now.duration_since(previous_print).as_secs_f64() >= PROGRESS_INTERVAL_SECS {
                info!(
                    "Step [{}/{}] | polarization {:.6} | elapsed {:.2} s",
                    step + 1,
                    total,
                    phi,
                    start_time.elapsed().as_secs_f64()
                );
                previous_print = now;
            }
        }
        series
    }

    fn frame(&self) -> Frame {
        Frame {
            iteration: self.current_iteration,
            particles: self.particles.clone(),
            polarization: polarization(&self.particles),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn initial_snapshot(&self) -> &[Particle] {
        &self.initial_snapshot
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn strategy(&self) -> NeighborStrategy {
        self.strategy
    }

    pub fn alignment_rule(&self) -> AlignmentRule {
        self.alignment
    }
}
