//! Sustained deflections integrated over time.
//!
//! Both actuators produce a constant-magnitude acceleration held along one of
//! the along-velocity / radial / normal directions. The default forward-Euler
//! scheme keeps the asteroid at its epoch position and refits the elements
//! after every step. RK4 integrates two-body motion plus thrust across each
//! step and winds the refitted mean anomaly back to the element epoch.

use serde::Serialize;
use thiserror::Error;

use neo_core::constants::{AU_KM, MU_SUN_KM3_S2};
use neo_core::units::wrap_two_pi;
use neo_core::vector::{self, Vector3};
use neo_impulsive::{ImpulseError, delta_v_along, direction_unit};
use neo_orbits::{AnomalyModel, CartesianState, ErrorKind, OrbitError, OrbitalElements};
use neo_propulsion::{GravityTractor, Integrator, LaserAblation, ParameterError, ThrustDirection};

/// Upper bound on integration steps for a single action.
pub const MAX_STEPS: usize = 10_000_000;

/// Most telemetry samples kept per action; longer runs are decimated.
pub const MAX_TELEMETRY_SAMPLES: usize = 10_000;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThrustError {
    #[error("integration step must be finite and positive (got {step_s} s)")]
    InvalidStep { step_s: f64 },
    #[error("{steps} integration steps exceed the limit of {limit}")]
    TooManySteps { steps: f64, limit: usize },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Direction(#[from] ImpulseError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

impl ThrustError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThrustError::InvalidStep { .. }
            | ThrustError::TooManySteps { .. }
            | ThrustError::Parameter(_) => ErrorKind::Domain,
            ThrustError::Direction(err) => err.kind(),
            ThrustError::Orbit(err) => err.kind(),
        }
    }
}

/// How a sustained action is discretised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepControl {
    pub step_s: f64,
    pub integrator: Integrator,
    pub anomaly: AnomalyModel,
    /// Shorten the last step to the remaining duration instead of taking a full step.
    pub truncate_final_step: bool,
}

impl Default for StepControl {
    fn default() -> Self {
        Self {
            step_s: 86_400.0,
            integrator: Integrator::Euler,
            anomaly: AnomalyModel::Exact,
            truncate_final_step: false,
        }
    }
}

/// Telemetry record taken after an integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepSample {
    pub time_s: f64,
    pub semi_major_axis_au: f64,
    pub eccentricity: f64,
    pub delta_v_km_s: f64,
}

/// Result of integrating a sustained action.
#[derive(Debug, Clone, PartialEq)]
pub struct SustainedOutcome {
    pub elements: OrbitalElements,
    pub delta_v_vector_km_s: Vector3,
    /// Norm of the accumulated velocity-change vector.
    pub delta_v_km_s: f64,
    pub steps: usize,
    pub elapsed_s: f64,
    /// At most [`MAX_TELEMETRY_SAMPLES`] records, always ending with the last step.
    pub samples: Vec<StepSample>,
}

/// Gravity tractor towing the asteroid for `tractor.duration_s`.
pub fn gravity_tractor(
    elements: &OrbitalElements,
    tractor: &GravityTractor,
    control: &StepControl,
) -> Result<SustainedOutcome, ThrustError> {
    tractor.validate()?;
    let accel = tractor.acceleration_km_s2();
    log::debug!(
        "gravity tractor: {:.0} kg at {:.3} km, a = {accel:.3e} km/s^2",
        tractor.spacecraft_mass_kg,
        tractor.standoff_km
    );
    integrate_constant_acceleration(elements, accel, tractor.direction, tractor.duration_s, control)
}

/// Laser ablation jet pushing the asteroid for `laser.duration_s`.
pub fn laser_ablation(
    elements: &OrbitalElements,
    laser: &LaserAblation,
    control: &StepControl,
) -> Result<SustainedOutcome, ThrustError> {
    laser.validate()?;
    let accel = laser.acceleration_km_s2();
    log::debug!(
        "laser ablation: {:.2} MW at efficiency {:.2}, thrust {:.3e} N, a = {accel:.3e} km/s^2",
        laser.power_mw,
        laser.efficiency,
        laser.thrust_newtons()
    );
    integrate_constant_acceleration(elements, accel, laser.direction, laser.duration_s, control)
}

/// Integrate a constant acceleration `accel_km_s2` along `direction`.
///
/// The duration is split into `ceil(duration/step)` full steps, so the thrust
/// acts for `steps·step` seconds; with `truncate_final_step` the last step
/// covers only the remaining time. A zero duration returns the input
/// elements untouched with zero delta-v.
pub fn integrate_constant_acceleration(
    elements: &OrbitalElements,
    accel_km_s2: f64,
    direction: ThrustDirection,
    duration_s: f64,
    control: &StepControl,
) -> Result<SustainedOutcome, ThrustError> {
    let step = control.step_s;
    if !step.is_finite() || step <= 0.0 {
        return Err(ThrustError::InvalidStep { step_s: step });
    }
    if !duration_s.is_finite() || duration_s < 0.0 {
        return Err(ParameterError {
            quantity: "duration",
            value: duration_s,
            requirement: "must be >= 0 s",
        }
        .into());
    }
    if !accel_km_s2.is_finite() {
        return Err(ParameterError {
            quantity: "acceleration",
            value: accel_km_s2,
            requirement: "must be finite",
        }
        .into());
    }
    let planned = (duration_s / step).ceil();
    if planned > MAX_STEPS as f64 {
        return Err(ThrustError::TooManySteps {
            steps: planned,
            limit: MAX_STEPS,
        });
    }

    let steps = planned as usize;
    let stride = steps.div_ceil(MAX_TELEMETRY_SAMPLES).max(1);

    let mut current = *elements;
    let mut total = vector::ZERO;
    let mut elapsed = 0.0;
    let mut samples = Vec::with_capacity(steps.div_ceil(stride).min(MAX_TELEMETRY_SAMPLES));

    for k in 0..steps {
        let last = k + 1 == steps;
        let dt = if last && control.truncate_final_step {
            duration_s - step * k as f64
        } else {
            step
        };
        let (next, dv) = match control.integrator {
            Integrator::Euler => euler_step(&current, accel_km_s2, direction, dt, control.anomaly)?,
            Integrator::Rk4 => rk4_step(&current, accel_km_s2, direction, dt, control.anomaly)?,
        };
        current = next;
        total = vector::add(&total, &dv);
        elapsed += dt;
        if (k + 1) % stride == 0 || last {
            samples.push(StepSample {
                time_s: elapsed,
                semi_major_axis_au: current.a,
                eccentricity: current.e,
                delta_v_km_s: vector::norm(&total),
            });
        }
        log::trace!(
            "step {}: t = {elapsed:.0} s, a = {:.12} AU, e = {:.9}",
            k + 1,
            current.a,
            current.e
        );
    }

    let delta_v_km_s = vector::norm(&total);
    log::debug!(
        "{steps} {:?} steps over {elapsed:.0} s: |dv| = {delta_v_km_s:.6e} km/s, a {:.9} -> {:.9} AU",
        control.integrator,
        elements.a,
        current.a
    );
    Ok(SustainedOutcome {
        elements: current,
        delta_v_vector_km_s: total,
        delta_v_km_s,
        steps,
        elapsed_s: elapsed,
        samples,
    })
}

/// Position held at the epoch; `Δv = a·dt` along the direction, then refit.
fn euler_step(
    elements: &OrbitalElements,
    accel: f64,
    direction: ThrustDirection,
    dt: f64,
    anomaly: AnomalyModel,
) -> Result<(OrbitalElements, Vector3), ThrustError> {
    let state = elements.to_cartesian_km(anomaly)?;
    let dv = delta_v_along(&state, direction, accel * dt)?;
    let pushed = CartesianState {
        position: state.position,
        velocity: vector::add(&state.velocity, &dv),
    };
    Ok((elements.with_cartesian_km(&pushed)?, dv))
}

/// Full two-body plus thrust dynamics over `dt`, refitted and wound back to the epoch.
fn rk4_step(
    elements: &OrbitalElements,
    accel: f64,
    direction: ThrustDirection,
    dt: f64,
    anomaly: AnomalyModel,
) -> Result<(OrbitalElements, Vector3), ThrustError> {
    let y0 = elements.to_cartesian_km(anomaly)?;

    let k1 = derivative(&y0, accel, direction)?;
    let k2 = derivative(&advance(&y0, &k1, 0.5 * dt), accel, direction)?;
    let k3 = derivative(&advance(&y0, &k2, 0.5 * dt), accel, direction)?;
    let k4 = derivative(&advance(&y0, &k3, dt), accel, direction)?;

    let weighted = |pick: fn(&Derivative) -> Vector3| {
        let sum = vector::add(
            &vector::add(&pick(&k1), &vector::scale(&pick(&k2), 2.0)),
            &vector::add(&vector::scale(&pick(&k3), 2.0), &pick(&k4)),
        );
        vector::scale(&sum, dt / 6.0)
    };
    let y1 = CartesianState {
        position: vector::add(&y0.position, &weighted(|d: &Derivative| d.velocity)),
        velocity: vector::add(&y0.velocity, &weighted(|d: &Derivative| d.acceleration)),
    };
    let dv = weighted(|d: &Derivative| d.thrust);

    let mut refit = elements.with_cartesian_km(&y1)?;
    if refit.e < 1.0 && refit.a > 0.0 {
        let a_km = refit.a * AU_KM;
        let n = (MU_SUN_KM3_S2 / (a_km * a_km * a_km)).sqrt();
        refit.ma = wrap_two_pi(refit.ma - n * dt);
    }
    Ok((refit, dv))
}

struct Derivative {
    velocity: Vector3,
    acceleration: Vector3,
    thrust: Vector3,
}

fn derivative(
    state: &CartesianState,
    accel: f64,
    direction: ThrustDirection,
) -> Result<Derivative, ThrustError> {
    let r = vector::norm(&state.position);
    if r == 0.0 {
        return Err(OrbitError::DegenerateState { vector: "position" }.into());
    }
    let gravity = vector::scale(&state.position, -MU_SUN_KM3_S2 / (r * r * r));
    let thrust = vector::scale(&direction_unit(state, direction)?, accel);
    Ok(Derivative {
        velocity: state.velocity,
        acceleration: vector::add(&gravity, &thrust),
        thrust,
    })
}

fn advance(state: &CartesianState, slope: &Derivative, h: f64) -> CartesianState {
    CartesianState {
        position: vector::add(&state.position, &vector::scale(&slope.velocity, h)),
        velocity: vector::add(&state.velocity, &vector::scale(&slope.acceleration, h)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use neo_propulsion::DEFAULT_ABLATION_EXHAUST_M_S;

    fn apophis_like() -> OrbitalElements {
        OrbitalElements::from_degrees(
            0.922_583, 0.191_481, 3.336_8, 204.043, 126.674, 268.84, 2_459_000.5, None,
        )
    }

    fn near_circular() -> OrbitalElements {
        OrbitalElements::from_degrees(1.1, 0.01, 2.0, 40.0, 60.0, 10.0, 2_459_000.5, None)
    }

    fn laser(duration_s: f64) -> LaserAblation {
        LaserAblation {
            power_mw: 100.0,
            efficiency: 0.5,
            asteroid_mass_kg: 1.0e9,
            duration_s,
            direction: ThrustDirection::AlongVelocity,
            exhaust_velocity_m_s: DEFAULT_ABLATION_EXHAUST_M_S,
        }
    }

    #[test]
    fn zero_duration_is_a_no_op() {
        let el = apophis_like();
        let tractor = GravityTractor {
            spacecraft_mass_kg: 20_000.0,
            standoff_km: 0.2,
            duration_s: 0.0,
            direction: ThrustDirection::AlongVelocity,
        };
        for integrator in [Integrator::Euler, Integrator::Rk4] {
            let control = StepControl {
                integrator,
                ..StepControl::default()
            };
            let out = gravity_tractor(&el, &tractor, &control).unwrap();
            assert_eq!(out.steps, 0);
            assert_eq!(out.delta_v_km_s, 0.0);
            assert_eq!(out.elements, el);

            let out = laser_ablation(&el, &laser(0.0), &control).unwrap();
            assert_eq!(out.steps, 0);
            assert_eq!(out.elements, el);
        }
    }

    #[test]
    fn euler_accumulates_acceleration_times_duration() {
        let el = apophis_like();
        let action = laser(10.0 * 86_400.0);
        let out = laser_ablation(&el, &action, &StepControl::default()).unwrap();
        assert_eq!(out.steps, 10);
        assert_eq!(out.samples.len(), 10);
        let expected = action.acceleration_km_s2() * action.duration_s;
        assert_relative_eq!(out.delta_v_km_s, expected, max_relative = 1e-3);
        assert!(out.elements.a > el.a);
    }

    #[test]
    fn partial_duration_takes_full_steps_by_default() {
        let el = apophis_like();
        let control = StepControl {
            step_s: 3_600.0,
            ..StepControl::default()
        };
        let action = laser(2.5 * 3_600.0);
        let out = laser_ablation(&el, &action, &control).unwrap();
        assert_eq!(out.steps, 3);
        assert_relative_eq!(out.elapsed_s, 10_800.0, epsilon = 1e-9);
        let expected = action.acceleration_km_s2() * 10_800.0;
        assert_relative_eq!(out.delta_v_km_s, expected, max_relative = 1e-6);
    }

    #[test]
    fn final_step_is_truncated_on_request() {
        let el = apophis_like();
        let control = StepControl {
            step_s: 3_600.0,
            truncate_final_step: true,
            ..StepControl::default()
        };
        let action = laser(2.5 * 3_600.0);
        let out = laser_ablation(&el, &action, &control).unwrap();
        assert_eq!(out.steps, 3);
        assert_relative_eq!(out.elapsed_s, 9_000.0, epsilon = 1e-9);
        let expected = action.acceleration_km_s2() * 9_000.0;
        assert_relative_eq!(out.delta_v_km_s, expected, max_relative = 1e-6);

        let full = laser_ablation(&el, &action, &StepControl { truncate_final_step: false, ..control })
            .unwrap();
        assert!(full.elements.a > out.elements.a);
    }

    #[test]
    fn long_runs_decimate_telemetry() {
        let el = apophis_like();
        let control = StepControl {
            step_s: 1.0,
            ..StepControl::default()
        };
        let action = laser(25_000.0);
        let out = laser_ablation(&el, &action, &control).unwrap();
        assert_eq!(out.steps, 25_000);
        assert!(out.samples.len() <= MAX_TELEMETRY_SAMPLES);
        assert_eq!(out.samples.len(), 8_334);
        let last = out.samples.last().unwrap();
        assert_eq!(last.time_s, out.elapsed_s);
        assert_eq!(last.delta_v_km_s, out.delta_v_km_s);
        assert!(out.samples.windows(2).all(|w| w[0].time_s < w[1].time_s));
    }

    #[test]
    fn tractor_pulls_gently() {
        let el = apophis_like();
        let tractor = GravityTractor {
            spacecraft_mass_kg: 20_000.0,
            standoff_km: 0.2,
            duration_s: 365.0 * 86_400.0,
            direction: ThrustDirection::AlongVelocity,
        };
        let out = gravity_tractor(&el, &tractor, &StepControl::default()).unwrap();
        assert_eq!(out.steps, 365);
        let expected = tractor.acceleration_km_s2() * tractor.duration_s;
        assert_relative_eq!(out.delta_v_km_s, expected, max_relative = 1e-6);
        assert!(out.delta_v_km_s < 1.0e-5);
    }

    #[test]
    fn rk4_agrees_with_euler_on_a_near_circular_orbit() {
        let el = near_circular();
        let action = laser(30.0 * 86_400.0);
        let euler = laser_ablation(&el, &action, &StepControl::default()).unwrap();
        let rk4 = laser_ablation(
            &el,
            &action,
            &StepControl {
                integrator: Integrator::Rk4,
                ..StepControl::default()
            },
        )
        .unwrap();
        let da_euler = euler.elements.a - el.a;
        let da_rk4 = rk4.elements.a - el.a;
        assert!(da_euler > 0.0 && da_rk4 > 0.0);
        assert_relative_eq!(da_rk4, da_euler, max_relative = 0.1);

        let scalar = action.acceleration_km_s2() * action.duration_s;
        assert!(rk4.delta_v_km_s <= scalar * (1.0 + 1e-9));
        assert!(rk4.delta_v_km_s > 0.95 * scalar);
    }

    #[test]
    fn invalid_inputs_are_domain_errors() {
        let el = apophis_like();
        let bad_step = StepControl {
            step_s: 0.0,
            ..StepControl::default()
        };
        let err = laser_ablation(&el, &laser(100.0), &bad_step).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);

        let mut weak = laser(100.0);
        weak.asteroid_mass_kg = -1.0;
        assert!(matches!(
            laser_ablation(&el, &weak, &StepControl::default()),
            Err(ThrustError::Parameter(_))
        ));

        let tiny_step = StepControl {
            step_s: 1.0e-6,
            ..StepControl::default()
        };
        assert!(matches!(
            laser_ablation(&el, &laser(86_400.0), &tiny_step),
            Err(ThrustError::TooManySteps { .. })
        ));
    }
}
