use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use neo_cli::{DEFAULT_CATALOG, catalog, describe, engine_settings, find_record, init_logging};
use neo_deflect::config::load_plan;
use neo_deflect::deflection::{Integrator, from_config, target_mass_kg};
use neo_deflect::epoch::{format_jd, parse_epoch};
use neo_deflect::export::report::write_json;
use neo_deflect::export::telemetry::write_step_samples;
use neo_deflect::export::writer_for_path;
use neo_deflect::lowthrust::StepSample;
use neo_deflect::mitigation::{
    CampaignResult, DeflectionCampaign, MitigationResult, evaluate_mitigation, miss_distance_km,
};
use neo_deflect::{Body, DeflectionSession, OrbitalElements};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Apply a deflection plan to a catalog body"
)]
struct Cli {
    /// Designation or name (case-insensitive)
    #[arg(long)]
    body: String,

    /// Ordered plan of actions (YAML list, TOML file or directory)
    #[arg(long)]
    plan: PathBuf,

    /// Small-body catalog (YAML, TOML or a directory of TOML files)
    #[arg(long, default_value = DEFAULT_CATALOG)]
    catalog: PathBuf,

    /// Engine settings TOML
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Encounter epoch used to score each action by Earth miss distance
    #[arg(long)]
    encounter: Option<String>,

    /// Integrator for sustained actions (overrides settings)
    #[arg(long, value_enum)]
    integrator: Option<IntegratorMode>,

    /// Integration step in seconds (overrides settings)
    #[arg(long)]
    step_s: Option<f64>,

    /// Write a JSON report (`-` for stdout)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write per-step telemetry of every sustained action as CSV
    #[arg(long)]
    telemetry: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum IntegratorMode {
    Euler,
    Rk4,
}

#[derive(Serialize)]
struct ActionReport {
    action: &'static str,
    delta_v_km_s: f64,
    steps: usize,
    elements: OrbitalElements,
    #[serde(skip_serializing_if = "Option::is_none")]
    miss_distance_km: Option<f64>,
}

#[derive(Serialize)]
struct EncounterReport {
    jd: f64,
    baseline_km: f64,
    final_km: f64,
    mitigation: MitigationResult,
    campaign: CampaignResult,
}

#[derive(Serialize)]
struct DeflectionReport {
    designation: String,
    initial: OrbitalElements,
    r#final: OrbitalElements,
    total_delta_v_km_s: f64,
    actions: Vec<ActionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encounter: Option<EncounterReport>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut settings = engine_settings(cli.settings.as_deref())?;
    if let Some(mode) = cli.integrator {
        settings.deflection.integrator = match mode {
            IntegratorMode::Euler => Integrator::Euler,
            IntegratorMode::Rk4 => Integrator::Rk4,
        };
    }
    if let Some(step) = cli.step_s {
        settings.deflection.step_s = step;
    }
    settings.validate()?;
    let solver = settings.kepler.solver();

    let catalog = catalog(&cli.catalog)?;
    let record = find_record(&catalog, &cli.body)?;
    let plan = load_plan(&cli.plan)?;
    if plan.is_empty() {
        anyhow::bail!("plan {} contains no actions", cli.plan.display());
    }
    let mass = target_mass_kg(record);

    let mut session = DeflectionSession::new(
        record.designation.clone(),
        record.elements(),
        settings.deflection,
    );

    let encounter = cli.encounter.as_deref().map(parse_epoch).transpose()?;
    let miss_at = |body: &Body, jd: f64| miss_distance_km(body, &Body::EarthAnalytic, &solver, jd);
    let mut campaign = match encounter {
        Some(jd) => Some((jd, DeflectionCampaign::new(miss_at(&session.body(), jd)?)?)),
        None => None,
    };

    println!("=== Deflection ===");
    println!("Body           : {}", describe(record));
    println!("Mass           : {mass:.3e} kg");
    println!(
        "Initial        : a = {:.9} AU, e = {:.9}",
        record.elements().a,
        record.elements().e
    );
    if let Some((jd, c)) = &campaign {
        println!(
            "Encounter      : {} baseline miss {:.1} km, safe window {:.1} - {:.1} km",
            format_jd(*jd),
            c.baseline_km(),
            c.safe_window_km().0,
            c.safe_window_km().1
        );
    }

    let mut actions = Vec::with_capacity(plan.len());
    let mut telemetry: Vec<StepSample> = Vec::new();
    for (index, entry) in plan.iter().enumerate() {
        let action = from_config(entry, mass, &settings.deflection)?;
        let outcome = session.apply(&action)?;
        let mut miss = None;
        if let Some((jd, c)) = campaign.as_mut() {
            let km = miss_at(&session.body(), *jd)?;
            let points = c.record_attempt(km);
            println!(
                "#{:<2} {:<16}: dv = {:.6} m/s, a = {:.9} AU, e = {:.9}, miss = {km:.1} km (+{points} pts)",
                index + 1,
                action.label(),
                outcome.delta_v_km_s * 1_000.0,
                outcome.elements.a,
                outcome.elements.e,
            );
            miss = Some(km);
        } else {
            println!(
                "#{:<2} {:<16}: dv = {:.6} m/s, a = {:.9} AU, e = {:.9}",
                index + 1,
                action.label(),
                outcome.delta_v_km_s * 1_000.0,
                outcome.elements.a,
                outcome.elements.e,
            );
        }
        telemetry.extend_from_slice(&outcome.samples);
        actions.push(ActionReport {
            action: action.label(),
            delta_v_km_s: outcome.delta_v_km_s,
            steps: outcome.steps,
            elements: outcome.elements,
            miss_distance_km: miss,
        });
    }

    println!(
        "Total          : dv = {:.6} m/s over {} actions",
        session.total_delta_v_km_s() * 1_000.0,
        session.attempts()
    );

    let encounter_report = match &campaign {
        Some((jd, c)) => {
            let final_km = c.last_miss_km();
            let mitigation = evaluate_mitigation(c.baseline_km(), final_km);
            let result = c.finish(final_km);
            println!(
                "Mitigation     : {:+.1} km, score {:.1}/100",
                mitigation.improvement_km, mitigation.score
            );
            println!(
                "Campaign       : {:?}, score {} (efficiency bonus {})",
                result.outcome, result.final_score, result.efficiency_bonus
            );
            Some(EncounterReport {
                jd: *jd,
                baseline_km: c.baseline_km(),
                final_km,
                mitigation,
                campaign: result,
            })
        }
        None => None,
    };

    if let Some(path) = &cli.telemetry {
        let mut writer = writer_for_path(path)?;
        write_step_samples(&mut writer, &telemetry)?;
        log::info!("wrote {} telemetry rows to {}", telemetry.len(), path.display());
    }

    if let Some(path) = &cli.report {
        let report = DeflectionReport {
            designation: record.designation.clone(),
            initial: *session.catalog_elements(),
            r#final: *session.current_elements(),
            total_delta_v_km_s: session.total_delta_v_km_s(),
            actions,
            encounter: encounter_report,
        };
        write_json(path, &report)?;
        log::info!("wrote report to {}", path.display());
    }

    Ok(())
}
