//! Deflection action descriptors and actuator parameters.
//!
//! These types only describe *what* is applied to an asteroid; the impulsive and
//! low-thrust crates turn them into velocity changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use neo_core::constants::G_KM3_KG_S2;
use neo_core::units::{m_to_km, mw_to_w};
use neo_core::vector::Vector3;

/// Exhaust velocity assumed for ablation vapour (m/s).
pub const DEFAULT_ABLATION_EXHAUST_M_S: f64 = 3_000.0;

/// Rejected actuator parameter.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid {quantity}: {value} ({requirement})")]
pub struct ParameterError {
    pub quantity: &'static str,
    pub value: f64,
    pub requirement: &'static str,
}

fn require(
    quantity: &'static str,
    value: f64,
    requirement: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ParameterError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ParameterError {
            quantity,
            value,
            requirement,
        })
    }
}

/// Reference direction a velocity change is applied along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrustDirection {
    /// Along the heliocentric velocity.
    #[default]
    #[serde(alias = "alongVelocity")]
    AlongVelocity,
    /// Along the Sun-to-body position vector.
    Radial,
    /// Along the orbital angular momentum `r × v`.
    Normal,
}

impl ThrustDirection {
    pub const ALL: [ThrustDirection; 3] = [
        ThrustDirection::AlongVelocity,
        ThrustDirection::Radial,
        ThrustDirection::Normal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ThrustDirection::AlongVelocity => "along-velocity",
            ThrustDirection::Radial => "radial",
            ThrustDirection::Normal => "normal",
        }
    }
}

impl fmt::Display for ThrustDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThrustDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "alongvelocity" | "prograde" | "velocity" => Ok(ThrustDirection::AlongVelocity),
            "radial" => Ok(ThrustDirection::Radial),
            "normal" => Ok(ThrustDirection::Normal),
            _ => Err(format!("unknown thrust direction '{s}'")),
        }
    }
}

/// Time integrator used for sustained actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Forward Euler on the element set.
    #[default]
    Euler,
    /// Classical fourth-order Runge-Kutta on the heliocentric state.
    Rk4,
}

/// Spacecraft hovering next to the asteroid and pulling it gravitationally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityTractor {
    pub spacecraft_mass_kg: f64,
    /// Centre-to-centre separation (km).
    pub standoff_km: f64,
    pub duration_s: f64,
    #[serde(default)]
    pub direction: ThrustDirection,
}

impl GravityTractor {
    /// Towing acceleration `G·m/r²` (km/s²).
    pub fn acceleration_km_s2(&self) -> f64 {
        G_KM3_KG_S2 * self.spacecraft_mass_kg / (self.standoff_km * self.standoff_km)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        require("spacecraft mass", self.spacecraft_mass_kg, "must be > 0 kg", |v| v > 0.0)?;
        require("standoff distance", self.standoff_km, "must be > 0 km", |v| v > 0.0)?;
        require("duration", self.duration_s, "must be >= 0 s", |v| v >= 0.0)
    }
}

/// Surface ablation laser vaporising material off the asteroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserAblation {
    pub power_mw: f64,
    /// Fraction of beam power converted into jet kinetic power, in `[0, 1]`.
    pub efficiency: f64,
    pub asteroid_mass_kg: f64,
    pub duration_s: f64,
    #[serde(default)]
    pub direction: ThrustDirection,
    #[serde(default = "default_exhaust")]
    pub exhaust_velocity_m_s: f64,
}

fn default_exhaust() -> f64 {
    DEFAULT_ABLATION_EXHAUST_M_S
}

impl LaserAblation {
    /// Jet thrust `η·P / v_e` (N).
    pub fn thrust_newtons(&self) -> f64 {
        self.efficiency * mw_to_w(self.power_mw) / self.exhaust_velocity_m_s
    }

    /// Resulting asteroid acceleration (km/s²).
    pub fn acceleration_km_s2(&self) -> f64 {
        m_to_km(self.thrust_newtons() / self.asteroid_mass_kg)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        require("laser power", self.power_mw, "must be >= 0 MW", |v| v >= 0.0)?;
        require("laser efficiency", self.efficiency, "must lie in [0, 1]", |v| {
            (0.0..=1.0).contains(&v)
        })?;
        require("asteroid mass", self.asteroid_mass_kg, "must be > 0 kg", |v| v > 0.0)?;
        require("exhaust velocity", self.exhaust_velocity_m_s, "must be > 0 m/s", |v| v > 0.0)?;
        require("duration", self.duration_s, "must be >= 0 s", |v| v >= 0.0)
    }
}

/// A single user-requested deflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeflectionAction {
    /// Instantaneous impactor delivering `delta_v_km_s` along `direction`.
    Kinetic {
        delta_v_km_s: f64,
        #[serde(default)]
        direction: ThrustDirection,
    },
    /// Explicit heliocentric velocity change (km/s).
    ManualDeltaV { delta_v_km_s: Vector3 },
    GravityTractor(GravityTractor),
    LaserAblation(LaserAblation),
}

impl DeflectionAction {
    pub fn label(&self) -> &'static str {
        match self {
            DeflectionAction::Kinetic { .. } => "kinetic impact",
            DeflectionAction::ManualDeltaV { .. } => "manual delta-v",
            DeflectionAction::GravityTractor(_) => "gravity tractor",
            DeflectionAction::LaserAblation(_) => "laser ablation",
        }
    }

    /// Whether the action is integrated over time rather than applied at once.
    pub fn is_sustained(&self) -> bool {
        matches!(
            self,
            DeflectionAction::GravityTractor(_) | DeflectionAction::LaserAblation(_)
        )
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            DeflectionAction::Kinetic { delta_v_km_s, .. } => require(
                "kinetic delta-v",
                *delta_v_km_s,
                "must be finite",
                |_| true,
            ),
            DeflectionAction::ManualDeltaV { delta_v_km_s } => {
                for component in delta_v_km_s {
                    require("manual delta-v component", *component, "must be finite", |_| true)?;
                }
                Ok(())
            }
            DeflectionAction::GravityTractor(tractor) => tractor.validate(),
            DeflectionAction::LaserAblation(laser) => laser.validate(),
        }
    }
}
