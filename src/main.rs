use anyhow::Result;
use log::{debug, info};
use std::time::Instant;

use vicsek_engine::config::{ExperimentMode, OutputConfig, SimulationConfig};
use vicsek_engine::output::{
    density_series_path, noise_series_path, write_animation, write_density_summary,
    write_noise_summary, write_polarization_series,
};
use vicsek_engine::simulation::Simulation;

fn main() -> Result<()> {
    env_logger::init();

    info!("Starting Vicsek flocking engine...");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = SimulationConfig::load(&config_path)?;
    info!("Loaded configuration from '{}'.", config_path);
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    let mode = config.experiment.mode;
    let output = config.output.clone();
    let noise_values = config.experiment.noise_sweep.as_ref().map(|sweep| sweep.values());
    let count_values = config.experiment.count_sweep.as_ref().map(|sweep| sweep.values());

    let mut sim = Simulation::new(config)?;
    debug!("Simulation parameters: {:#?}", sim.params());

    let start_time = Instant::now();
    match mode {
        ExperimentMode::Animation => run_animation(&mut sim, &output)?,
        ExperimentMode::Polarization => {
            let values = noise_values
                .ok_or_else(|| anyhow::anyhow!("polarization mode requires [experiment.noise_sweep]"))?;
            run_polarization_sweep(&mut sim, &values, &output)?;
        }
        ExperimentMode::Density => {
            let values = count_values
                .ok_or_else(|| anyhow::anyhow!("density mode requires [experiment.count_sweep]"))?;
            run_density_sweep(&mut sim, &values, &output)?;
        }
    }

    let total_duration = start_time.elapsed();
    info!("Experiment finished in {:.3} seconds.", total_duration.as_secs_f64());
    Ok(())
}

fn run_animation(sim: &mut Simulation, output: &OutputConfig) -> Result<()> {
    let frames = sim.run_for_animation();
    info!(
        "Animation run complete: {} frames, final polarization {:.6}",
        frames.len(),
        frames.last().map(|frame| frame.polarization).unwrap_or(0.0)
    );
    let path = format!("{}.txt", output.base_filename);
    write_animation(&path, &frames, sim.params().density)?;
    Ok(())
}

fn run_polarization_sweep(sim: &mut Simulation, noise_values: &[f64], output: &OutputConfig) -> Result<()> {
    let points = sim.run_for_polarization_sweep(noise_values);

    if output.save_series {
        for point in &points {
            let path = noise_series_path(&output.base_filename, point.noise_amplitude);
            write_polarization_series(&path, &point.series)?;
            info!(
                "nu={:.2}: stationary polarization {:.6}, series saved to {}",
                point.noise_amplitude, point.polarization, path
            );
        }
    }
    if output.save_summary {
        let path = format!("{}_polarization.csv", output.base_filename);
        write_noise_summary(&path, &points)?;
    }
    Ok(())
}

fn run_density_sweep(sim: &mut Simulation, counts: &[u32], output: &OutputConfig) -> Result<()> {
    let points = sim.run_for_density_sweep(counts);

    if output.save_series {
        for point in &points {
            let path = density_series_path(&output.base_filename, point.count);
            write_polarization_series(&path, &point.series)?;
            info!(
                "n={} (density {:.3}): stationary polarization {:.6}, series saved to {}",
                point.count, point.density, point.polarization, path
            );
        }
    }
    if output.save_summary {
        let path = format!("{}_density.csv", output.base_filename);
        write_density_summary(&path, &points)?;
    }
    Ok(())
}
