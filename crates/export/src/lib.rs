//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod positions {
    use std::io::{self, Write};

    use neo_core::vector::Vector3;

    const CLOUD_HEADER: &str = "sample,x_au,y_au,z_au";
    const PATH_HEADER: &str = "point,x_au,y_au,z_au";

    /// Write one row per cloud sample.
    pub fn write_point_cloud(writer: &mut dyn Write, positions: &[Vector3]) -> io::Result<()> {
        writeln!(writer, "{CLOUD_HEADER}")?;
        for (index, [x, y, z]) in positions.iter().enumerate() {
            writeln!(writer, "{index},{x:.12},{y:.12},{z:.12}")?;
        }
        writer.flush()
    }

    /// Write a sampled orbit path, oldest point first.
    pub fn write_orbit_path(writer: &mut dyn Write, points: &[Vector3]) -> io::Result<()> {
        writeln!(writer, "{PATH_HEADER}")?;
        for (index, [x, y, z]) in points.iter().enumerate() {
            writeln!(writer, "{index},{x:.12},{y:.12},{z:.12}")?;
        }
        writer.flush()
    }
}

pub mod telemetry {
    use std::io::{self, Write};

    use neo_lowthrust::StepSample;

    const HEADER: &str = "time_s,semi_major_axis_au,eccentricity,delta_v_km_s";

    /// Write the per-step telemetry of a sustained deflection.
    pub fn write_step_samples(writer: &mut dyn Write, samples: &[StepSample]) -> io::Result<()> {
        writeln!(writer, "{HEADER}")?;
        for s in samples {
            writeln!(
                writer,
                "{:.3},{:.12},{:.12},{:.12e}",
                s.time_s, s.semi_major_axis_au, s.eccentricity, s.delta_v_km_s
            )?;
        }
        writer.flush()
    }
}

pub mod report {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::{self, Write};
    use std::path::Path;

    /// Pretty-print any serializable report as JSON to `path` (`-` for stdout).
    pub fn write_json<T: Serialize>(path: &Path, report: &T) -> io::Result<()> {
        let mut writer = super::writer_for_path(path)?;
        to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()
    }
}
