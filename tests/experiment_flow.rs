use std::fs;

use vicsek_engine::config::SimulationConfig;
use vicsek_engine::metrics;
use vicsek_engine::output;
use vicsek_engine::simulation::Simulation;
use vicsek_engine::update::AlignmentRule;

// An interaction radius larger than the torus diameter makes every particle
// everyone's neighbor, so one noiseless step averages all headings into the
// same value and polarization hits 1 immediately.
#[test]
fn fully_connected_swarm_aligns_in_one_noiseless_step() {
    let mut config = SimulationConfig::from_parameters(10, 1.0, 5, 5.0, 4.0, 0.0);
    config.experiment.seed = 3;
    let mut sim = Simulation::new(config).expect("valid configuration");
    assert_eq!(sim.params().grid_dim, 1);

    sim.step();

    let headings: Vec<f64> = sim.particles().iter().map(|p| p.heading).collect();
    let spread = headings
        .iter()
        .fold(0.0f64, |acc, &h| acc.max((h - headings[0]).abs()));
    assert!(spread < 1e-12, "headings spread {spread} after a fully connected step");
    assert!(metrics::polarization(sim.particles()) > 1.0 - 1e-9);
}

#[test]
fn low_noise_orders_and_saturating_noise_does_not() {
    let mut config = SimulationConfig::from_parameters(150, 1.0, 200, 5.0, 1.0, 0.1);
    config.experiment.seed = 11;
    let mut sim = Simulation::new(config).expect("valid configuration");
    let initial = metrics::polarization(sim.initial_snapshot());

    // 10 exceeds 2*pi, so in the second run the noise term scrambles
    // headings across the whole circle no matter what the alignment
    // computed.
    let points = sim.run_for_polarization_sweep(&[0.1, 10.0]);

    let ordered = &points[0];
    let disordered = &points[1];
    assert!(
        ordered.polarization > 0.5 && ordered.polarization > 2.0 * initial,
        "low-noise run failed to order: {} from initial {}",
        ordered.polarization,
        initial
    );
    assert!(
        disordered.polarization < 0.15,
        "saturating-noise run ordered anyway: {}",
        disordered.polarization
    );
    assert!(ordered.polarization > disordered.polarization);
}

// With zero amplitude the noise draws are still consumed but contribute
// nothing, so two sweep points over the same snapshot must reproduce each
// other exactly.
#[test]
fn sweep_points_reuse_the_snapshot_exactly_at_zero_noise() {
    let mut config = SimulationConfig::from_parameters(60, 1.0, 10, 5.0, 1.0, 0.2);
    config.experiment.seed = 5;
    let mut sim = Simulation::new(config).expect("valid configuration");

    let points = sim.run_for_polarization_sweep(&[0.0, 0.0]);
    assert_eq!(points[0].series, points[1].series);
    assert_eq!(sim.params().noise_amplitude, 0.2);
}

// The random-neighbor rule copies headings, it never synthesizes one; with
// zero noise every post-step heading must already exist in the previous
// generation.
#[test]
fn random_neighbor_never_invents_headings() {
    let mut config = SimulationConfig::from_parameters(100, 1.0, 5, 5.0, 1.0, 0.0);
    config.experiment.alignment = AlignmentRule::RandomNeighbor;
    config.experiment.seed = 21;
    let mut sim = Simulation::new(config).expect("valid configuration");

    let previous: Vec<f64> = sim.particles().iter().map(|p| p.heading).collect();
    sim.step();
    for p in sim.particles() {
        assert!(
            previous.iter().any(|&h| h == p.heading),
            "particle {} moved to a heading nobody held",
            p.id
        );
    }
}

#[test]
fn full_pipeline_from_config_file() {
    let dir = std::env::temp_dir().join(format!("vicsek_flow_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    let base = dir.join("run").to_string_lossy().into_owned();

    let config_text = format!(
        r#"
[domain]
side_length = 5.0
interaction_radius = 1.0

[particles]
count = 40
noise_amplitude = 0.5

[timing]
max_iterations = 6

[experiment]
mode = "polarization"
seed = 77

[experiment.noise_sweep]
min = 0.5
max = 1.0
step = 0.5

[output]
base_filename = "{base}"
"#
    );
    let config_path = dir.join("config.toml");
    fs::write(&config_path, config_text).expect("write config");

    let config = SimulationConfig::load(&config_path).expect("load config");
    let values = config
        .experiment
        .noise_sweep
        .as_ref()
        .expect("sweep table")
        .values();
    assert_eq!(values.len(), 2);

    let output_config = config.output.clone();
    let mut sim = Simulation::new(config).expect("valid configuration");

    let points = sim.run_for_polarization_sweep(&values);
    for point in &points {
        let path = output::noise_series_path(&output_config.base_filename, point.noise_amplitude);
        output::write_polarization_series(&path, &point.series).expect("series write");
        let text = fs::read_to_string(&path).expect("series read");
        assert_eq!(text.lines().count(), 6);
    }
    let summary_path = format!("{}_polarization.csv", output_config.base_filename);
    output::write_noise_summary(&summary_path, &points).expect("summary write");
    let summary = fs::read_to_string(&summary_path).expect("summary read");
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.starts_with("nu;polarization\n"));

    // The same driver can follow up with an animation run.
    let frames = sim.run_for_animation();
    let animation_path = format!("{}.txt", output_config.base_filename);
    output::write_animation(&animation_path, &frames, sim.params().density).expect("animation write");
    let animation = fs::read_to_string(&animation_path).expect("animation read");
    assert_eq!(animation.lines().filter(|line| line.starts_with("t:")).count(), 7);
    assert_eq!(
        animation.lines().filter(|line| line.starts_with("polarization:")).count(),
        7
    );
    assert!(animation.ends_with("density:1.600\n"));

    fs::remove_dir_all(&dir).ok();
}
