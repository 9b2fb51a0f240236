use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use log::info;

use crate::simulation::{DensitySweepPoint, Frame, NoiseSweepPoint};

/// Writes an animation log: per frame a `t:` header, one `id;x;y;heading`
/// line per particle and the frame's polarization, then one trailing line
/// with the run's density. The layout is parsed by external plotting
/// tooling, so the digit counts are fixed.
pub fn write_animation<P: AsRef<Path>>(path: P, frames: &[Frame], density: f64) -> Result<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref)
        .map_err(|e| anyhow::anyhow!("Failed to create animation file '{}': {}", path_ref.display(), e))?;
    let mut out = BufWriter::new(file);

    for frame in frames {
        writeln!(out, "t:{}", frame.iteration)?;
        for p in &frame.particles {
            writeln!(out, "{};{:.5};{:.5};{:.5}", p.id, p.position.x, p.position.y, p.heading)?;
        }
        writeln!(out, "polarization:{:.6}", frame.polarization)?;
    }
    writeln!(out, "density:{:.3}", density)?;
    out.flush()?;

    info!("Animation log saved to {}", path_ref.display());
    Ok(())
}

/// Writes a polarization series: one value per line, one line per iteration.
pub fn write_polarization_series<P: AsRef<Path>>(path: P, series: &[f64]) -> Result<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref)
        .map_err(|e| anyhow::anyhow!("Failed to create series file '{}': {}", path_ref.display(), e))?;
    let mut out = BufWriter::new(file);
    for value in series {
        writeln!(out, "{:.6}", value)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the noise sweep summary table: `nu;polarization`.
pub fn write_noise_summary<P: AsRef<Path>>(path: P, points: &[NoiseSweepPoint]) -> Result<()> {
    let path_ref = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path_ref)
        .map_err(|e| anyhow::anyhow!("Failed to create summary file '{}': {}", path_ref.display(), e))?;

    writer.write_record(["nu", "polarization"])?;
    for point in points {
        writer.write_record([
            format!("{:.6}", point.noise_amplitude),
            format!("{:.6}", point.polarization),
        ])?;
    }
    writer.flush()?;

    info!("Noise sweep summary saved to {}", path_ref.display());
    Ok(())
}

/// Writes the density sweep summary table: `n;density;polarization`.
pub fn write_density_summary<P: AsRef<Path>>(path: P, points: &[DensitySweepPoint]) -> Result<()> {
    let path_ref = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path_ref)
        .map_err(|e| anyhow::anyhow!("Failed to create summary file '{}': {}", path_ref.display(), e))?;

    writer.write_record(["n", "density", "polarization"])?;
    for point in points {
        writer.write_record([
            point.count.to_string(),
            format!("{:.6}", point.density),
            format!("{:.6}", point.polarization),
        ])?;
    }
    writer.flush()?;

    info!("Density sweep summary saved to {}", path_ref.display());
    Ok(())
}

/// File name for one noise sweep series.
pub fn noise_series_path(base: &str, nu: f64) -> String {
    format!("{}_nu_{:.2}.txt", base, nu)
}

/// File name for one density sweep series.
pub fn density_series_path(base: &str, count: u32) -> String {
    format!("{}_D_{}.txt", base, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use crate::vecmath::Vec2;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vicsek_output_{}_{}", std::process::id(), name))
    }

    #[test]
    fn animation_layout_is_stable() {
        let frames = vec![Frame {
            iteration: 0,
            particles: vec![
                Particle::new(0, Vec2::new(1.0, 2.0), 0.5, 0.03),
                Particle::new(1, Vec2::new(0.25, 4.75), -1.25, 0.03),
            ],
            polarization: 0.875,
        }];
        let path = scratch("animation.txt");
        write_animation(&path, &frames, 12.0).expect("animation write");
        let text = fs::read_to_string(&path).expect("animation read");
        fs::remove_file(&path).ok();

        assert_eq!(
            text,
            "t:0\n\
             0;1.00000;2.00000;0.50000\n\
             1;0.25000;4.75000;-1.25000\n\
             polarization:0.875000\n\
             density:12.000\n"
        );
    }

    #[test]
    fn series_is_one_value_per_line() {
        let path = scratch("series.txt");
        write_polarization_series(&path, &[0.5, 0.25]).expect("series write");
        let text = fs::read_to_string(&path).expect("series read");
        fs::remove_file(&path).ok();
        assert_eq!(text, "0.500000\n0.250000\n");
    }

    #[test]
    fn summaries_are_semicolon_delimited() {
        let path = scratch("noise_summary.csv");
        let points = vec![NoiseSweepPoint {
            noise_amplitude: 0.5,
            polarization: 0.123456,
            series: vec![],
        }];
        write_noise_summary(&path, &points).expect("summary write");
        let text = fs::read_to_string(&path).expect("summary read");
        fs::remove_file(&path).ok();
        assert_eq!(text, "nu;polarization\n0.500000;0.123456\n");

        let path = scratch("density_summary.csv");
        let points = vec![DensitySweepPoint {
            count: 300,
            density: 12.0,
            polarization: 0.9,
            series: vec![],
        }];
        write_density_summary(&path, &points).expect("summary write");
        let text = fs::read_to_string(&path).expect("summary read");
        fs::remove_file(&path).ok();
        assert_eq!(text, "n;density;polarization\n300;12.000000;0.900000\n");
    }

    #[test]
    fn series_file_names_match_the_expected_stitching() {
        assert_eq!(noise_series_path("run", 0.5), "run_nu_0.50.txt");
        assert_eq!(noise_series_path("run", 2.0), "run_nu_2.00.txt");
        assert_eq!(density_series_path("run", 300), "run_D_300.txt");
    }
}
