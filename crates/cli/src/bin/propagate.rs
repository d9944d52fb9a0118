use std::path::PathBuf;

use clap::Parser;
use neo_cli::{DEFAULT_CATALOG, engine_settings, init_logging, resolve_target};
use neo_deflect::epoch::{format_jd, parse_epoch};
use neo_deflect::export::{positions::write_orbit_path, writer_for_path};
use neo_deflect::kernel::constants::AU_KM;
use neo_deflect::kernel::time::jd_to_day_offset;
use neo_deflect::kernel::vector::norm;
use neo_deflect::mitigation::{closest_approach, miss_distance_km};
use neo_deflect::orbits::orbit_path;
use neo_deflect::Body;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Heliocentric position of a catalog body or major planet"
)]
struct Cli {
    /// Designation, name or planet (case-insensitive)
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

    /// Search this many days after the epoch for the closest Earth approach
    #[arg(long)]
    approach_days: Option<f64>,

    /// Grid step of the approach search (days)
    #[arg(long, default_value_t = 1.0)]
    approach_step: f64,

    /// Write the revolution ending at the epoch as CSV (`-` for stdout)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Points per revolution for --path
    #[arg(long, default_value_t = 360)]
    path_samples: usize,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = engine_settings(cli.settings.as_deref())?;
    let solver = settings.kepler.solver();
    let jd = parse_epoch(&cli.epoch)?;
    let target = resolve_target(&cli.catalog, &cli.body)?;

    let position = target.body.coordinates_at_jd(&solver, jd)?;
    let earth_km = miss_distance_km(&target.body, &Body::EarthAnalytic, &solver, jd)?;

    println!("=== Position ===");
    println!("Body           : {}", target.label);
    println!("Epoch          : {} (JD {jd:.5})", format_jd(jd));
    println!(
        "Heliocentric   : x = {:.9} AU, y = {:.9} AU, z = {:.9} AU",
        position[0], position[1], position[2]
    );
    println!("Sun distance   : {:.9} AU", norm(&position));
    println!(
        "Earth distance : {earth_km:.1} km ({:.6} AU)",
        earth_km / AU_KM
    );
    println!("Period         : {:.3} days", target.body.period_days());

    if let Some(days) = cli.approach_days {
        let approach = closest_approach(
            &target.body,
            &Body::EarthAnalytic,
            &solver,
            jd,
            jd + days,
            cli.approach_step,
        )?;
        println!(
            "Closest approach: {:.1} km on {} (JD {:.5})",
            approach.distance_km,
            format_jd(approach.jd),
            approach.jd
        );
    }

    if let Some(path) = &cli.path {
        let points = orbit_path(&target.body, &solver, jd_to_day_offset(jd), cli.path_samples)?;
        let mut writer = writer_for_path(path)?;
        write_orbit_path(&mut writer, &points)?;
        log::info!("wrote {} orbit points to {}", points.len(), path.display());
    }

    Ok(())
}
