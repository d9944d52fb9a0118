//! Conversion from plan entries to runtime deflection actions.

use std::f64::consts::PI;

use neo_config::{ActionConfig, BodyRecord, DeflectionSettings};
use neo_core::time::days_to_seconds;
use neo_core::units::ms_to_kms;
use neo_propulsion::{DeflectionAction, GravityTractor, LaserAblation};

use crate::DeflectionError;

/// Mass assumed for a target with neither a catalog mass nor a diameter (kg).
pub const DEFAULT_ASTEROID_MASS_KG: f64 = 8.64e8;
/// Bulk density used to estimate a mass from a diameter (kg/m³).
pub const DEFAULT_BULK_DENSITY_KG_M3: f64 = 2_000.0;

/// Best available mass for a catalog body.
pub fn target_mass_kg(record: &BodyRecord) -> f64 {
    if let Some(mass) = record.mass_kg {
        return mass;
    }
    if let Some(diameter) = record.diameter_m {
        let radius = 0.5 * diameter;
        return DEFAULT_BULK_DENSITY_KG_M3 * 4.0 / 3.0 * PI * radius * radius * radius;
    }
    log::warn!(
        "{} has no mass or diameter; assuming {DEFAULT_ASTEROID_MASS_KG:e} kg",
        record.label()
    );
    DEFAULT_ASTEROID_MASS_KG
}

/// Convert a plan entry into a [`DeflectionAction`].
///
/// `target_mass` fills in laser plans that omit the asteroid mass.
pub fn from_config(
    config: &ActionConfig,
    target_mass: f64,
    settings: &DeflectionSettings,
) -> Result<DeflectionAction, DeflectionError> {
    let action = match config {
        ActionConfig::Kinetic {
            delta_v_m_s,
            direction,
        } => DeflectionAction::Kinetic {
            delta_v_km_s: ms_to_kms(*delta_v_m_s),
            direction: *direction,
        },
        ActionConfig::ManualDeltaV { delta_v_m_s } => DeflectionAction::ManualDeltaV {
            delta_v_km_s: delta_v_m_s.map(ms_to_kms),
        },
        ActionConfig::GravityTractor {
            spacecraft_mass_kg,
            standoff_km,
            duration_days,
            direction,
        } => DeflectionAction::GravityTractor(GravityTractor {
            spacecraft_mass_kg: *spacecraft_mass_kg,
            standoff_km: *standoff_km,
            duration_s: days_to_seconds(*duration_days),
            direction: *direction,
        }),
        ActionConfig::LaserAblation {
            power_mw,
            efficiency,
            duration_days,
            asteroid_mass_kg,
            exhaust_velocity_m_s,
            direction,
        } => DeflectionAction::LaserAblation(LaserAblation {
            power_mw: *power_mw,
            efficiency: *efficiency,
            asteroid_mass_kg: asteroid_mass_kg.unwrap_or(target_mass),
            duration_s: days_to_seconds(*duration_days),
            direction: *direction,
            exhaust_velocity_m_s: exhaust_velocity_m_s.unwrap_or(settings.exhaust_velocity_m_s),
        }),
        ActionConfig::Unsupported => return Err(DeflectionError::UnsupportedAction),
    };
    action.validate()?;
    Ok(action)
}
