use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::neighbors::NeighborStrategy;
use crate::sim_params::{grid_dim_for, SimParams};
use crate::update::AlignmentRule;

/// Validation failure raised before any simulation step runs. Everything past
/// construction is infallible, so this is the whole error surface of the
/// engine itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("side_length must be positive, got {0}")]
    InvalidSideLength(f64),
    #[error("interaction_radius must be positive, got {0}")]
    InvalidInteractionRadius(f64),
    #[error("particle count must be greater than zero")]
    NoParticles,
    #[error("speed must be positive, got {0}")]
    InvalidSpeed(f64),
    #[error("time_step must be positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("max_iterations must be greater than zero")]
    NoIterations,
    #[error("noise_amplitude must be non-negative, got {0}")]
    InvalidNoise(f64),
    #[error("invalid sweep range: {0}")]
    InvalidSweep(String),
}

// Configuration for the periodic domain
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DomainConfig {
    pub side_length: f64,
    pub interaction_radius: f64,
}

// Configuration for the particle population
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParticleConfig {
    pub count: u32,
    #[serde(default = "default_speed")]
    pub speed: f64,
    pub noise_amplitude: f64,
}

// Configuration for stepping
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    pub max_iterations: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentMode {
    /// One run, full per-step particle states written out.
    Animation,
    /// Noise sweep: stationary polarization per noise amplitude.
    Polarization,
    /// Density sweep: stationary polarization per particle count.
    Density,
}

// Which experiment to run and how the engine resolves neighbors and headings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExperimentConfig {
    pub mode: ExperimentMode,
    #[serde(default = "default_strategy")]
    pub strategy: NeighborStrategy,
    #[serde(default = "default_alignment")]
    pub alignment: AlignmentRule,
    pub seed: u64,
    #[serde(default)]
    pub noise_sweep: Option<NoiseSweepConfig>,
    #[serde(default)]
    pub count_sweep: Option<CountSweepConfig>,
}

// Noise amplitudes to sweep in polarization mode: min..=max by step
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NoiseSweepConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NoiseSweepConfig {
    /// Expands the range into the list of noise amplitudes to run. The
    /// tolerance keeps `max` in the list when repeated addition drifts past
    /// it by a rounding error.
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut nu = self.min;
        while nu <= self.max + self.step * 1e-6 {
            out.push(nu);
            nu += self.step;
        }
        out
    }

    fn check(&self) -> Result<(), ConfigError> {
        if !(self.step > 0.0) {
            return Err(ConfigError::InvalidSweep(format!(
                "noise sweep step must be positive, got {}",
                self.step
            )));
        }
        if !(self.min >= 0.0) {
            return Err(ConfigError::InvalidSweep(format!(
                "noise sweep minimum must be non-negative, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidSweep(format!(
                "noise sweep minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

// Particle counts to sweep in density mode: min..=max by step
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CountSweepConfig {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl CountSweepConfig {
    pub fn values(&self) -> Vec<u32> {
        (self.min..=self.max).step_by(self.step as usize).collect()
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::InvalidSweep("count sweep step must be positive".into()));
        }
        if self.min == 0 {
            return Err(ConfigError::InvalidSweep("count sweep minimum must be positive".into()));
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidSweep(format!(
                "count sweep minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    /// Write the per-iteration polarization series file for each sweep value.
    #[serde(default = "default_true")]
    pub save_series: bool,
    /// Write the sweep summary table.
    #[serde(default = "default_true")]
    pub save_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: default_base_filename(),
            save_series: true,
            save_summary: true,
        }
    }
}

// Main simulation configuration structure, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub domain: DomainConfig,
    pub particles: ParticleConfig,
    pub timing: TimingConfig,
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads and validates the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: SimulationConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration directly from the core model parameters, for
    /// library callers that do not go through a TOML file. Defaults: animation
    /// mode, cell-index strategy, circular-mean alignment, seed 1.
    pub fn from_parameters(
        count: u32,
        time_step: f64,
        max_iterations: u32,
        side_length: f64,
        interaction_radius: f64,
        noise_amplitude: f64,
    ) -> Self {
        SimulationConfig {
            domain: DomainConfig { side_length, interaction_radius },
            particles: ParticleConfig {
                count,
                speed: default_speed(),
                noise_amplitude,
            },
            timing: TimingConfig { time_step, max_iterations },
            experiment: ExperimentConfig {
                mode: ExperimentMode::Animation,
                strategy: default_strategy(),
                alignment: default_alignment(),
                seed: 1,
                noise_sweep: None,
                count_sweep: None,
            },
            output: OutputConfig::default(),
        }
    }

    /// Checks every constraint the engine relies on. Called by `load` and
    /// again by the driver constructor, so a hand-built configuration cannot
    /// bypass it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.domain.side_length > 0.0) {
            return Err(ConfigError::InvalidSideLength(self.domain.side_length));
        }
        if !(self.domain.interaction_radius > 0.0) {
            return Err(ConfigError::InvalidInteractionRadius(self.domain.interaction_radius));
        }
        if self.particles.count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if !(self.particles.speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.particles.speed));
        }
        if !(self.particles.noise_amplitude >= 0.0) {
            return Err(ConfigError::InvalidNoise(self.particles.noise_amplitude));
        }
        if !(self.timing.time_step > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.timing.time_step));
        }
        if self.timing.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }

        match self.experiment.mode {
            ExperimentMode::Polarization => match &self.experiment.noise_sweep {
                None => {
                    return Err(ConfigError::InvalidSweep(
                        "polarization mode requires a [experiment.noise_sweep] table".into(),
                    ));
                }
                Some(sweep) => sweep.check()?,
            },
            ExperimentMode::Density => match &self.experiment.count_sweep {
                None => {
                    return Err(ConfigError::InvalidSweep(
                        "density mode requires a [experiment.count_sweep] table".into(),
                    ));
                }
                Some(sweep) => sweep.check()?,
            },
            ExperimentMode::Animation => {}
        }

        Ok(())
    }

    /// Derives the runtime parameters used on every step.
    pub fn sim_params(&self) -> Result<SimParams, ConfigError> {
        self.validate()?;

        let l = self.domain.side_length;
        let r = self.domain.interaction_radius;
        let grid_dim = grid_dim_for(l, r);

        Ok(SimParams {
            side_length: l,
            interaction_radius: r,
            interaction_radius_sq: r * r,
            grid_dim,
            cell_size: l / grid_dim as f64,
            n: self.particles.count,
            speed: self.particles.speed,
            density: self.particles.count as f64 / (l * l),
            time_step: self.timing.time_step,
            max_iterations: self.timing.max_iterations,
            noise_amplitude: self.particles.noise_amplitude,
        })
    }
}

// The classic model speed; most runs never override it.
fn default_speed() -> f64 {
    0.03
}

fn default_time_step() -> f64 {
    1.0
}

fn default_strategy() -> NeighborStrategy {
    NeighborStrategy::CellIndex
}

fn default_alignment() -> AlignmentRule {
    AlignmentRule::CircularMean
}

fn default_base_filename() -> String {
    "vicsek".to_string()
}

fn default_true() -> bool {
    true
}
