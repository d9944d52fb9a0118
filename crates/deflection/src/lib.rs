//! Deflection façade: one entry point over every action kind.

pub mod action;
pub mod session;

pub use action::{DEFAULT_ASTEROID_MASS_KG, from_config, target_mass_kg};
pub use neo_propulsion::{
    DeflectionAction, GravityTractor, Integrator, LaserAblation, ThrustDirection,
};
pub use session::{AppliedAction, DeflectionSession};

use serde::Serialize;
use thiserror::Error;

use neo_config::DeflectionSettings;
use neo_core::vector::Vector3;
use neo_impulsive::ImpulseError;
use neo_lowthrust::{StepControl, StepSample, ThrustError};
use neo_orbits::{ErrorKind, OrbitalElements};
use neo_propulsion::ParameterError;

/// Errors surfaced when converting or applying deflection actions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeflectionError {
    #[error("deflection action type is not supported")]
    UnsupportedAction,
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Impulse(#[from] ImpulseError),
    #[error(transparent)]
    Thrust(#[from] ThrustError),
}

impl DeflectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeflectionError::UnsupportedAction | DeflectionError::Parameter(_) => ErrorKind::Domain,
            DeflectionError::Impulse(err) => err.kind(),
            DeflectionError::Thrust(err) => err.kind(),
        }
    }
}

/// New element set plus the velocity change that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeflectionOutcome {
    pub action: DeflectionAction,
    pub elements: OrbitalElements,
    pub delta_v_vector_km_s: Vector3,
    pub delta_v_km_s: f64,
    pub steps: usize,
    pub samples: Vec<StepSample>,
}

pub fn step_control(settings: &DeflectionSettings) -> StepControl {
    StepControl {
        step_s: settings.step_s,
        integrator: settings.integrator,
        anomaly: settings.anomaly,
        truncate_final_step: settings.truncate_final_step,
    }
}

/// Apply `action` to `elements` and return the replacement element set.
pub fn apply_deflection(
    elements: &OrbitalElements,
    action: &DeflectionAction,
    settings: &DeflectionSettings,
) -> Result<DeflectionOutcome, DeflectionError> {
    action.validate()?;
    log::info!("applying {}", action.label());
    let outcome = match action {
        DeflectionAction::Kinetic {
            delta_v_km_s,
            direction,
        } => {
            let out =
                neo_impulsive::kinetic_impact(elements, *delta_v_km_s, *direction, settings.anomaly)?;
            impulsive_outcome(action, out)
        }
        DeflectionAction::ManualDeltaV { delta_v_km_s } => {
            let out = neo_impulsive::manual_delta_v(elements, *delta_v_km_s, settings.anomaly)?;
            impulsive_outcome(action, out)
        }
        DeflectionAction::GravityTractor(tractor) => {
            let out = neo_lowthrust::gravity_tractor(elements, tractor, &step_control(settings))?;
            sustained_outcome(action, out)
        }
        DeflectionAction::LaserAblation(laser) => {
            let out = neo_lowthrust::laser_ablation(elements, laser, &step_control(settings))?;
            sustained_outcome(action, out)
        }
    };
    log::info!(
        "{}: |dv| = {:.3} mm/s, a {:.9} -> {:.9} AU, e {:.6} -> {:.6}",
        action.label(),
        outcome.delta_v_km_s * 1.0e6,
        elements.a,
        outcome.elements.a,
        elements.e,
        outcome.elements.e
    );
    Ok(outcome)
}

fn impulsive_outcome(
    action: &DeflectionAction,
    out: neo_impulsive::ImpulseOutcome,
) -> DeflectionOutcome {
    DeflectionOutcome {
        action: *action,
        elements: out.elements,
        delta_v_vector_km_s: out.delta_v_vector_km_s,
        delta_v_km_s: out.delta_v_km_s,
        steps: 1,
        samples: Vec::new(),
    }
}

fn sustained_outcome(
    action: &DeflectionAction,
    out: neo_lowthrust::SustainedOutcome,
) -> DeflectionOutcome {
    DeflectionOutcome {
        action: *action,
        elements: out.elements,
        delta_v_vector_km_s: out.delta_v_vector_km_s,
        delta_v_km_s: out.delta_v_km_s,
        steps: out.steps,
        samples: out.samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn elements() -> OrbitalElements {
        OrbitalElements::from_degrees(
            1.458, 0.2227, 10.83, 304.3, 178.9, 246.9, 2_459_000.5, None,
        )
    }

    #[test]
    fn dispatches_every_action_kind() {
        let settings = DeflectionSettings::default();
        let el = elements();
        let actions = [
            DeflectionAction::Kinetic {
                delta_v_km_s: 1.0e-3,
                direction: ThrustDirection::AlongVelocity,
            },
            DeflectionAction::ManualDeltaV {
                delta_v_km_s: [1.0e-4, 0.0, 0.0],
            },
            DeflectionAction::GravityTractor(GravityTractor {
                spacecraft_mass_kg: 2.0e4,
                standoff_km: 0.2,
                duration_s: 5.0 * 86_400.0,
                direction: ThrustDirection::AlongVelocity,
            }),
            DeflectionAction::LaserAblation(LaserAblation {
                power_mw: 10.0,
                efficiency: 0.5,
                asteroid_mass_kg: 8.64e8,
                duration_s: 5.0 * 86_400.0,
                direction: ThrustDirection::Radial,
                exhaust_velocity_m_s: 3_000.0,
            }),
        ];
        let steps: Vec<usize> = actions
            .iter()
            .map(|action| apply_deflection(&el, action, &settings).unwrap().steps)
            .collect();
        assert_eq!(steps, [1, 1, 5, 5]);
    }

    #[test]
    fn settings_choose_how_the_last_step_is_taken() {
        let el = elements();
        let laser = LaserAblation {
            power_mw: 10.0,
            efficiency: 0.5,
            asteroid_mass_kg: 8.64e8,
            duration_s: 1.5 * 86_400.0,
            direction: ThrustDirection::AlongVelocity,
            exhaust_velocity_m_s: 3_000.0,
        };
        let accel = laser.acceleration_km_s2();
        let action = DeflectionAction::LaserAblation(laser);

        let full = apply_deflection(&el, &action, &DeflectionSettings::default()).unwrap();
        assert_eq!(full.steps, 2);
        assert_relative_eq!(full.delta_v_km_s, accel * 2.0 * 86_400.0, max_relative = 1e-6);

        let settings = DeflectionSettings {
            truncate_final_step: true,
            ..DeflectionSettings::default()
        };
        assert!(step_control(&settings).truncate_final_step);
        let truncated = apply_deflection(&el, &action, &settings).unwrap();
        assert_eq!(truncated.steps, 2);
        assert_relative_eq!(truncated.delta_v_km_s, accel * 1.5 * 86_400.0, max_relative = 1e-6);
    }

    #[test]
    fn zero_kinetic_impact_is_identity() {
        let el = elements();
        let out = apply_deflection(
            &el,
            &DeflectionAction::Kinetic {
                delta_v_km_s: 0.0,
                direction: ThrustDirection::Normal,
            },
            &DeflectionSettings::default(),
        )
        .unwrap();
        assert_eq!(out.delta_v_km_s, 0.0);
        assert_relative_eq!(out.elements.a, el.a, max_relative = 1e-10);
        assert_relative_eq!(out.elements.e, el.e, max_relative = 1e-9);
    }

    #[test]
    fn invalid_parameters_are_domain_errors() {
        let err = apply_deflection(
            &elements(),
            &DeflectionAction::GravityTractor(GravityTractor {
                spacecraft_mass_kg: 2.0e4,
                standoff_km: 0.0,
                duration_s: 86_400.0,
                direction: ThrustDirection::AlongVelocity,
            }),
            &DeflectionSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DeflectionError::Parameter(_)));
        assert_eq!(err.kind(), ErrorKind::Domain);
    }
}
