use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use neo_cli::{DEFAULT_CATALOG, catalog, describe, engine_settings, find_record, init_logging};
use neo_deflect::epoch::{format_jd, parse_epoch};
use neo_deflect::export::{positions::write_point_cloud, writer_for_path};
use neo_deflect::kernel::constants::AU_KM;
use neo_deflect::kernel::vector::distance;
use neo_deflect::{Body, CovarianceModel, sample_uncertainty_cloud};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Monte Carlo position cloud from a catalog covariance"
)]
struct Cli {
    /// Designation or name (case-insensitive)
    #[arg(long)]
    body: String,

    /// Julian Date, YYYY-MM-DD, 'YYYY-MM-DD HH:MM' or RFC 3339 (UTC)
    #[arg(long)]
    epoch: String,

    /// Small-body catalog (YAML, TOML or a directory of TOML files)
    #[arg(long, default_value = DEFAULT_CATALOG)]
    catalog: PathBuf,

    /// Engine settings TOML
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of samples (overrides settings)
    #[arg(long)]
    samples: Option<usize>,

    /// Generator seed (overrides settings; random when neither is set)
    #[arg(long)]
    seed: Option<u64>,

    /// CSV destination (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = engine_settings(cli.settings.as_deref())?;
    let solver = settings.kepler.solver();
    let jd = parse_epoch(&cli.epoch)?;

    let catalog = catalog(&cli.catalog)?;
    let record = find_record(&catalog, &cli.body)?;
    let elements = record.elements();
    let covariance = record
        .covariance
        .as_ref()
        .map(|cov| CovarianceModel::from_record(cov, &elements, record.q))
        .transpose()
        .with_context(|| format!("covariance of {}", record.designation))?;

    let samples = cli.samples.unwrap_or(settings.uncertainty.samples);
    let seed = cli
        .seed
        .or(settings.uncertainty.seed)
        .unwrap_or_else(rand::random);

    let cloud = sample_uncertainty_cloud(&elements, covariance.as_ref(), samples, jd, seed, &solver)
        .with_context(|| format!("sampling {}", describe(record)))?;

    let mut writer = writer_for_path(&cli.output)?;
    write_point_cloud(&mut writer, cloud.positions())?;
    drop(writer);

    let earth = Body::EarthAnalytic.coordinates_at_jd(&solver, jd)?;
    let mut summary = String::new();
    writeln!(summary, "=== Uncertainty cloud ===")?;
    writeln!(summary, "Body           : {}", describe(record))?;
    writeln!(summary, "Epoch          : {} (JD {jd:.5})", format_jd(jd))?;
    writeln!(summary, "Samples        : {} (seed {seed})", cloud.len())?;
    if let (Some(centroid), Some(spread)) = (cloud.centroid(), cloud.rms_spread()) {
        writeln!(
            summary,
            "Centroid       : x = {:.9} AU, y = {:.9} AU, z = {:.9} AU",
            centroid[0], centroid[1], centroid[2]
        )?;
        writeln!(summary, "RMS spread     : {:.1} km", spread * AU_KM)?;
        writeln!(
            summary,
            "Earth distance : {:.1} km (centroid)",
            distance(&centroid, &earth) * AU_KM
        )?;
    }

    // Keep stdout clean for the CSV.
    if cli.output == Path::new("-") {
        eprint!("{summary}");
    } else {
        print!("{summary}");
        log::info!("wrote {} samples to {}", cloud.len(), cli.output.display());
    }
    Ok(())
}
