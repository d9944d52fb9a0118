//! Unit vectors of the along-velocity / radial / normal basis.

use neo_core::vector::{self, Vector3};
use neo_orbits::CartesianState;
use neo_propulsion::ThrustDirection;

use crate::ImpulseError;

/// Unit vector for `direction` at `state`.
///
/// Fails instead of dividing by zero when the reference vector vanishes.
pub fn direction_unit(
    state: &CartesianState,
    direction: ThrustDirection,
) -> Result<Vector3, ImpulseError> {
    let (reference, name) = match direction {
        ThrustDirection::AlongVelocity => (state.velocity, "velocity"),
        ThrustDirection::Radial => (state.position, "position"),
        ThrustDirection::Normal => (state.angular_momentum(), "angular momentum"),
    };
    vector::unit(&reference).ok_or(ImpulseError::DegenerateDirection {
        direction,
        reference: name,
    })
}

/// Velocity change of `magnitude` along `direction`.
pub fn delta_v_along(
    state: &CartesianState,
    direction: ThrustDirection,
    magnitude: f64,
) -> Result<Vector3, ImpulseError> {
    Ok(vector::scale(&direction_unit(state, direction)?, magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use neo_orbits::ErrorKind;

    fn state() -> CartesianState {
        CartesianState {
            position: [1.0e8, 0.0, 0.0],
            velocity: [0.0, 30.0, 1.0],
        }
    }

    #[test]
    fn basis_vectors_follow_the_state() {
        let s = state();
        let along = direction_unit(&s, ThrustDirection::AlongVelocity).unwrap();
        assert_relative_eq!(vector::norm(&along), 1.0, epsilon = 1e-15);
        assert_relative_eq!(along[1], 30.0 / (901.0_f64).sqrt(), epsilon = 1e-15);

        let radial = direction_unit(&s, ThrustDirection::Radial).unwrap();
        assert_eq!(radial, [1.0, 0.0, 0.0]);

        let normal = direction_unit(&s, ThrustDirection::Normal).unwrap();
        assert_relative_eq!(vector::dot(&normal, &s.position), 0.0, epsilon = 1e-9);
        assert_relative_eq!(vector::dot(&normal, &s.velocity), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_reference_vectors_are_domain_errors() {
        let still = CartesianState {
            position: [1.0e8, 0.0, 0.0],
            velocity: [0.0; 3],
        };
        for direction in [ThrustDirection::AlongVelocity, ThrustDirection::Normal] {
            let err = delta_v_along(&still, direction, 1.0e-3).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain);
        }

        let at_sun = CartesianState {
            position: [0.0; 3],
            velocity: [0.0, 30.0, 0.0],
        };
        assert!(matches!(
            delta_v_along(&at_sun, ThrustDirection::Radial, 1.0e-3),
            Err(ImpulseError::DegenerateDirection {
                reference: "position",
                ..
            })
        ));
    }
}
