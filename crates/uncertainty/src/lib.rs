//! Monte Carlo propagation of orbit-determination uncertainty.
//!
//! Correlated element draws `nominal + L·z` are turned into element sets and
//! evaluated with the orbit propagator at a target epoch. Every sample owns a
//! generator seeded from `(seed, index)`, so a cloud is reproducible regardless
//! of how rayon schedules the work.

pub mod cloud;
pub mod covariance;

pub use cloud::{PointCloud, draw_samples, sample_elements, sample_uncertainty_cloud};
pub use covariance::{CovarianceModel, ElementLabel};

use neo_orbits::{ErrorKind, OrbitError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UncertaintyError {
    #[error("no covariance is available for this body; uncertainty sampling is disabled")]
    MissingCovariance,
    #[error("invalid covariance: {0}")]
    InvalidCovariance(String),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

impl UncertaintyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UncertaintyError::MissingCovariance | UncertaintyError::InvalidCovariance(_) => {
                ErrorKind::Domain
            }
            UncertaintyError::Orbit(err) => err.kind(),
        }
    }
}
