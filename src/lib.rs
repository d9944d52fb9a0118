//! Near-Earth-object deflection engine.
//!
//! The workspace crates are re-exported by concern; the functions at the crate
//! root are the entry points the command-line tools and embedding front-ends
//! call: position of a body, deflection of an element set, Monte Carlo cloud
//! and mitigation scoring.

pub mod epoch;

pub use neo_config as config;
pub use neo_core as kernel;
pub use neo_deflection as deflection;
pub use neo_export as export;
pub use neo_impulsive as impulsive;
pub use neo_lowthrust as lowthrust;
pub use neo_mitigation as mitigation;
pub use neo_orbits as orbits;
pub use neo_propulsion as propulsion;
pub use neo_uncertainty as uncertainty;

pub use neo_deflection::{DeflectionOutcome, DeflectionSession, apply_deflection};
pub use neo_mitigation::{evaluate_impact, evaluate_mitigation};
pub use neo_orbits::{Body, ErrorKind, KeplerSolver, OrbitalElements, Planet};
pub use neo_uncertainty::{CovarianceModel, PointCloud, sample_uncertainty_cloud};

use neo_core::vector::Vector3;
use thiserror::Error;

/// Any failure surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Orbit(#[from] neo_orbits::OrbitError),
    #[error(transparent)]
    Deflection(#[from] neo_deflection::DeflectionError),
    #[error(transparent)]
    Uncertainty(#[from] neo_uncertainty::UncertaintyError),
    #[error(transparent)]
    Mitigation(#[from] neo_mitigation::MitigationError),
    #[error(transparent)]
    Config(#[from] neo_config::ConfigError),
    #[error(transparent)]
    Epoch(#[from] epoch::EpochError),
}

impl Error {
    /// Engine classification; configuration failures have none.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Orbit(err) => Some(err.kind()),
            Error::Deflection(err) => Some(err.kind()),
            Error::Uncertainty(err) => Some(err.kind()),
            Error::Mitigation(err) => Some(err.kind()),
            Error::Epoch(_) => Some(ErrorKind::Domain),
            Error::Config(_) => None,
        }
    }
}

/// Heliocentric ecliptic position (AU) of an element set `days_offset` days
/// after JD 2451543.5.
pub fn coordinates(elements: &OrbitalElements, days_offset: f64) -> Result<Vector3, Error> {
    Ok(Body::from_elements(elements).coordinates(days_offset)?)
}

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
