//! Instantaneous deflections: a velocity change applied at the element epoch.

pub mod basis;
pub mod kick;

pub use basis::{delta_v_along, direction_unit};
pub use kick::{ImpulseOutcome, apply_delta_v, kinetic_impact, manual_delta_v};

use neo_orbits::{ErrorKind, OrbitError};
use neo_propulsion::{ParameterError, ThrustDirection};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImpulseError {
    #[error("{direction} direction is undefined: zero-length {reference} vector")]
    DegenerateDirection {
        direction: ThrustDirection,
        reference: &'static str,
    },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

impl ImpulseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImpulseError::DegenerateDirection { .. } | ImpulseError::Parameter(_) => ErrorKind::Domain,
            ImpulseError::Orbit(err) => err.kind(),
        }
    }
}
