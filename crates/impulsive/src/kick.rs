//! Kinetic impactor and explicit delta-v manoeuvres.

use neo_core::vector::{self, Vector3};
use neo_orbits::{AnomalyModel, CartesianState, OrbitalElements};
use neo_propulsion::ThrustDirection;

use crate::ImpulseError;
use crate::basis::delta_v_along;

/// Element set after an instantaneous velocity change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseOutcome {
    pub elements: OrbitalElements,
    pub delta_v_vector_km_s: Vector3,
    pub delta_v_km_s: f64,
}

/// Add `delta_v` (km/s) to the heliocentric velocity implied by `elements` and refit.
pub fn apply_delta_v(
    elements: &OrbitalElements,
    delta_v: Vector3,
    anomaly: AnomalyModel,
) -> Result<OrbitalElements, ImpulseError> {
    let state = elements.to_cartesian_km(anomaly)?;
    let kicked = CartesianState {
        position: state.position,
        velocity: vector::add(&state.velocity, &delta_v),
    };
    elements.with_cartesian_km(&kicked).map_err(ImpulseError::from)
}

/// Kinetic impact: `delta_v_km_s` applied along `direction` at the element epoch.
pub fn kinetic_impact(
    elements: &OrbitalElements,
    delta_v_km_s: f64,
    direction: ThrustDirection,
    anomaly: AnomalyModel,
) -> Result<ImpulseOutcome, ImpulseError> {
    let state = elements.to_cartesian_km(anomaly)?;
    let dv = delta_v_along(&state, direction, delta_v_km_s)?;
    let updated = apply_delta_v(elements, dv, anomaly)?;
    log::debug!(
        "kinetic impact {direction}: |dv| = {:.6e} km/s, a {:.9} -> {:.9} AU",
        delta_v_km_s.abs(),
        elements.a,
        updated.a
    );
    Ok(ImpulseOutcome {
        elements: updated,
        delta_v_vector_km_s: dv,
        delta_v_km_s: vector::norm(&dv),
    })
}

/// Manual delta-v: an explicit heliocentric velocity change.
pub fn manual_delta_v(
    elements: &OrbitalElements,
    delta_v_km_s: Vector3,
    anomaly: AnomalyModel,
) -> Result<ImpulseOutcome, ImpulseError> {
    let updated = apply_delta_v(elements, delta_v_km_s, anomaly)?;
    Ok(ImpulseOutcome {
        elements: updated,
        delta_v_vector_km_s: delta_v_km_s,
        delta_v_km_s: vector::norm(&delta_v_km_s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn bennu_like() -> OrbitalElements {
        OrbitalElements::from_degrees(
            1.126_391, 0.203_745, 6.0349, 2.0609, 66.2231, 101.7039, 2_455_562.5, None,
        )
    }

    fn same_angle(a: f64, b: f64) -> bool {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d) < 1e-8
    }

    #[test]
    fn zero_delta_v_leaves_elements_unchanged() {
        let el = bennu_like();
        for direction in neo_propulsion::ThrustDirection::ALL {
            let out = kinetic_impact(&el, 0.0, direction, AnomalyModel::Exact).unwrap();
            assert_eq!(out.delta_v_km_s, 0.0);
            assert_relative_eq!(out.elements.a, el.a, max_relative = 1e-10);
            assert_relative_eq!(out.elements.e, el.e, max_relative = 1e-9);
            assert!(same_angle(out.elements.i, el.i));
            assert!(same_angle(out.elements.om, el.om));
            assert!(same_angle(out.elements.w, el.w));
            assert!(same_angle(out.elements.ma, el.ma));
            assert_eq!(out.elements.epoch_jd, el.epoch_jd);
        }
    }

    #[test]
    fn prograde_kick_raises_the_orbit() {
        let el = bennu_like();
        let out = kinetic_impact(&el, 1.0e-3, ThrustDirection::AlongVelocity, AnomalyModel::Exact)
            .unwrap();
        assert!(out.elements.a > el.a);
        assert_relative_eq!(out.delta_v_km_s, 1.0e-3, max_relative = 1e-12);

        let retro = kinetic_impact(&el, -1.0e-3, ThrustDirection::AlongVelocity, AnomalyModel::Exact)
            .unwrap();
        assert!(retro.elements.a < el.a);
    }

    #[test]
    fn normal_kick_tilts_the_plane_only_slightly() {
        let el = bennu_like();
        let out = kinetic_impact(&el, 1.0e-2, ThrustDirection::Normal, AnomalyModel::Exact).unwrap();
        assert!((out.elements.i - el.i).abs() > 1e-6);
        assert_relative_eq!(out.elements.a, el.a, max_relative = 1e-6);
    }

    #[test]
    fn kinetic_impact_matches_an_explicit_kick_along_the_basis() {
        let el = bennu_like();
        for direction in [
            ThrustDirection::AlongVelocity,
            ThrustDirection::Radial,
            ThrustDirection::Normal,
        ] {
            let out = kinetic_impact(&el, 2.0e-3, direction, AnomalyModel::Exact).unwrap();
            let state = el.to_cartesian_km(AnomalyModel::Exact).unwrap();
            let dv = delta_v_along(&state, direction, 2.0e-3).unwrap();
            assert_eq!(out.delta_v_vector_km_s, dv);
            let manual = manual_delta_v(&el, dv, AnomalyModel::Exact).unwrap();
            assert_eq!(out.elements, manual.elements);
        }
    }

    #[test]
    fn manual_delta_v_reports_vector_norm() {
        let el = bennu_like();
        let out = manual_delta_v(&el, [3.0e-4, 0.0, 4.0e-4], AnomalyModel::Exact).unwrap();
        assert_relative_eq!(out.delta_v_km_s, 5.0e-4, max_relative = 1e-12);
        assert!(out.elements.a.is_finite());
    }

    #[test]
    fn escape_kick_propagates_orbit_errors() {
        let el = bennu_like();
        // Roughly 40 km/s prograde pushes the asteroid onto an unbound orbit.
        let out = kinetic_impact(&el, 40.0, ThrustDirection::AlongVelocity, AnomalyModel::Exact).unwrap();
        assert!(out.elements.e > 1.0);
        assert!(out.elements.a < 0.0);
        assert!(out.elements.to_cartesian_km(AnomalyModel::Exact).is_err());
    }
}
