//! Scoring of deflection attempts against an Earth encounter.
//!
//! [`score`] holds the pure scoring functions, [`approach`] measures the
//! encounter geometry with the orbit propagator and [`campaign`] tracks a
//! sequence of attempts against a safe miss-distance window.

pub mod approach;
pub mod campaign;
pub mod score;

pub use approach::{ClosestApproach, closest_approach, miss_distance_km};
pub use campaign::{CampaignOutcome, CampaignResult, DeflectionCampaign};
pub use score::{
    ImpactAssessment, MitigationResult, evaluate_impact, evaluate_mitigation,
    linear_miss_estimate_km,
};

use neo_orbits::{ErrorKind, OrbitError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MitigationError {
    #[error("search window [{start_jd}, {end_jd}] is empty or not finite")]
    InvalidWindow { start_jd: f64, end_jd: f64 },
    #[error("scan step must be positive and finite (got {0} days)")]
    InvalidStep(f64),
    #[error("safe window [{min_km}, {max_km}] km is invalid")]
    InvalidThresholds { min_km: f64, max_km: f64 },
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

impl MitigationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MitigationError::Orbit(err) => err.kind(),
            _ => ErrorKind::Domain,
        }
    }
}
