//! Orbit propagation and element/state conversion for heliocentric bodies.
//!
//! Angles inside [`OrbitalElements`] are radians; the secular element tables
//! used by [`body::Body`] keep the degree-based convention of the classic
//! low-precision planetary ephemerides they reproduce.

pub mod body;
pub mod elements;
pub mod kepler;
pub mod state;

pub use body::{Body, Planet, Rate, SecularElements, orbit_path, perihelion_day};
pub use elements::{OrbitalElements, period_from_semi_major_axis};
pub use kepler::KeplerSolver;
pub use state::{AnomalyModel, CartesianState, Keplerian, cartesian_to_keplerian, keplerian_to_cartesian};

use thiserror::Error;

/// Coarse classification of failures, shared by every crate that wraps [`OrbitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied inputs outside the operation's domain.
    Domain,
    /// An iterative solver ran out of steps.
    Convergence,
    /// The input lies in a region the algorithms deliberately do not handle.
    ApproximationGap,
}

/// Errors raised while propagating or converting orbits.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrbitError {
    #[error("eccentricity {eccentricity} is outside the elliptical domain [0, 1)")]
    EccentricityOutOfRange { eccentricity: f64 },
    #[error("{quantity} must be finite and positive (got {value})")]
    InvalidParameter { quantity: &'static str, value: f64 },
    #[error("{quantity} is not finite")]
    NonFinite { quantity: &'static str },
    #[error("state vector is degenerate: zero-length {vector}")]
    DegenerateState { vector: &'static str },
    #[error(
        "Kepler's equation did not converge after {iterations} iterations (last step {last_step_deg:.3e} deg)"
    )]
    NoConvergence { iterations: usize, last_step_deg: f64 },
    #[error("near-parabolic orbit (e = {eccentricity}) is not supported by the element conversion")]
    NearParabolic { eccentricity: f64 },
}

impl OrbitError {
    /// Classify the error for caller-side retry/fallback policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrbitError::NoConvergence { .. } => ErrorKind::Convergence,
            OrbitError::NearParabolic { .. } => ErrorKind::ApproximationGap,
            OrbitError::EccentricityOutOfRange { .. }
            | OrbitError::InvalidParameter { .. }
            | OrbitError::NonFinite { .. }
            | OrbitError::DegenerateState { .. } => ErrorKind::Domain,
        }
    }
}

pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64, OrbitError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OrbitError::NonFinite { quantity })
    }
}

pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> Result<f64, OrbitError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(OrbitError::InvalidParameter { quantity, value })
    }
}
