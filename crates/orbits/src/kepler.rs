//! Kepler's equation `M = E − e·sin E` for elliptical orbits.

use std::f64::consts::TAU;

use neo_core::units::wrap_two_pi;

use crate::{OrbitError, ensure_finite};

/// Bounded Newton solver for the elliptical Kepler equation.
///
/// Iteration starts from `E₀ = M + e·sin M·(1 + e·cos M)` and stops once two
/// successive estimates differ by less than `tolerance_rad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    pub tolerance_rad: f64,
    pub max_iterations: usize,
}

impl KeplerSolver {
    /// Convergence threshold of the display propagator, in degrees.
    pub const DEFAULT_TOLERANCE_DEG: f64 = 0.005;
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;

    pub fn new(tolerance_deg: f64, max_iterations: usize) -> Self {
        Self {
            tolerance_rad: tolerance_deg.to_radians(),
            max_iterations,
        }
    }

    /// Tight solver used by the state converter, where round trips must be lossless.
    pub fn precise() -> Self {
        Self {
            tolerance_rad: 1.0e-13,
            max_iterations: 64,
        }
    }

    pub fn tolerance_deg(&self) -> f64 {
        self.tolerance_rad.to_degrees()
    }

    /// Solve for the eccentric anomaly (radians, same branch as `mean_anomaly`).
    pub fn eccentric_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
        let m = ensure_finite("mean anomaly", mean_anomaly)?;
        let e = ensure_finite("eccentricity", eccentricity)?;
        if !(0.0..1.0).contains(&e) {
            return Err(OrbitError::EccentricityOutOfRange { eccentricity: e });
        }
        if self.tolerance_rad.is_nan() || self.tolerance_rad <= 0.0 {
            return Err(OrbitError::InvalidParameter {
                quantity: "Kepler tolerance",
                value: self.tolerance_rad,
            });
        }

        let (sin_m, cos_m) = m.sin_cos();
        let mut estimate = m + e * sin_m * (1.0 + e * cos_m);
        let mut last_step = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let (sin_e, cos_e) = estimate.sin_cos();
            let next = estimate - (estimate - e * sin_e - m) / (1.0 - e * cos_e);
            last_step = (next - estimate).abs();
            estimate = next;
            if last_step < self.tolerance_rad {
                log::trace!("Kepler solve converged in {iteration} iterations (e = {e})");
                return Ok(estimate);
            }
        }

        Err(OrbitError::NoConvergence {
            iterations: self.max_iterations,
            last_step_deg: last_step.to_degrees(),
        })
    }
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOLERANCE_DEG, Self::DEFAULT_MAX_ITERATIONS)
    }
}

/// True anomaly from eccentric anomaly, normalized to `[0, 2π)`.
pub fn true_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * eccentric_anomaly;
    let nu = 2.0
        * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos());
    wrap_two_pi(nu)
}

/// Eccentric anomaly from true anomaly for `e < 1`, normalized to `[0, 2π)`.
pub fn eccentric_from_true(true_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * true_anomaly;
    let ea = 2.0
        * ((1.0 - eccentricity).sqrt() * half.sin()).atan2((1.0 + eccentricity).sqrt() * half.cos());
    let wrapped = ea.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Mean anomaly from eccentric anomaly.
#[inline]
pub fn mean_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn converges_across_the_elliptical_range() {
        let solver = KeplerSolver::default();
        let tolerance = KeplerSolver::DEFAULT_TOLERANCE_DEG.to_radians();
        for ei in 0..=19 {
            let e = ei as f64 * 0.05;
            for mi in 0..360 {
                let m = (mi as f64).to_radians();
                let ea = solver
                    .eccentric_anomaly(m, e)
                    .unwrap_or_else(|err| panic!("e={e} M={mi}: {err}"));
                let residual = mean_from_eccentric(ea, e) - m;
                assert!(residual.abs() < tolerance, "e={e} M={mi} residual={residual}");
            }
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        let ea = KeplerSolver::precise().eccentric_anomaly(1.234, 0.0).unwrap();
        assert_relative_eq!(ea, 1.234, epsilon = 1e-14);
    }

    #[test]
    fn rejects_unbound_eccentricity() {
        let solver = KeplerSolver::default();
        assert!(matches!(
            solver.eccentric_anomaly(0.5, 1.0),
            Err(OrbitError::EccentricityOutOfRange { .. })
        ));
        assert!(matches!(
            solver.eccentric_anomaly(0.5, -0.1),
            Err(OrbitError::EccentricityOutOfRange { .. })
        ));
        assert!(matches!(
            solver.eccentric_anomaly(f64::NAN, 0.1),
            Err(OrbitError::NonFinite { .. })
        ));
    }

    #[test]
    fn iteration_cap_reports_convergence_error() {
        let solver = KeplerSolver {
            tolerance_rad: 1e-300,
            max_iterations: 2,
        };
        let err = solver.eccentric_anomaly(1.0, 0.9).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Convergence);
    }

    #[test]
    fn anomaly_conversions_are_inverse() {
        for e in [0.0, 0.1, 0.5, 0.9] {
            for k in 0..12 {
                let ea = k as f64 * 0.5;
                let nu = true_from_eccentric(ea, e);
                let back = eccentric_from_true(nu, e);
                assert_relative_eq!(back, ea.rem_euclid(TAU), epsilon = 1e-10);
            }
        }
    }
}
