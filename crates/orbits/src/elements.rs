//! Osculating element sets as received from catalogs and produced by deflections.

use serde::{Deserialize, Serialize};

use neo_core::constants::{AU_KM, KEPLER_YEAR_DAYS, MU_SUN_KM3_S2};
use neo_core::units::wrap_two_pi;

use crate::OrbitError;
use crate::state::{
    AnomalyModel, CartesianState, Keplerian, cartesian_to_keplerian, keplerian_to_cartesian,
};

/// Osculating heliocentric elements at an epoch.
///
/// Distances in AU, angles in radians. The set is replaced wholesale after a
/// deflection; nothing mutates individual fields in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (AU).
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination (rad).
    pub i: f64,
    /// Longitude of the ascending node (rad).
    pub om: f64,
    /// Argument of perihelion (rad).
    pub w: f64,
    /// Mean anomaly at `epoch_jd` (rad).
    pub ma: f64,
    /// Julian Date at which `ma` is valid.
    pub epoch_jd: f64,
    /// Orbital period (days); derived from `a` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_days: Option<f64>,
}

impl OrbitalElements {
    /// Build an element set from catalog values given in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn from_degrees(
        a: f64,
        e: f64,
        i_deg: f64,
        om_deg: f64,
        w_deg: f64,
        ma_deg: f64,
        epoch_jd: f64,
        period_days: Option<f64>,
    ) -> Self {
        Self {
            a,
            e,
            i: i_deg.to_radians(),
            om: om_deg.to_radians(),
            w: w_deg.to_radians(),
            ma: ma_deg.to_radians(),
            epoch_jd,
            period_days,
        }
    }

    /// Orbital period in days (catalog value, or Kepler's third law).
    pub fn period(&self) -> f64 {
        self.period_days
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or_else(|| period_from_semi_major_axis(self.a))
    }

    /// Perihelion distance (AU).
    pub fn perihelion_distance(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    /// Aphelion distance (AU).
    pub fn aphelion_distance(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Geometric elements scaled to kilometres, ready for the state converter.
    pub fn to_keplerian_km(&self) -> Keplerian {
        Keplerian {
            a: self.a * AU_KM,
            e: self.e,
            i: self.i,
            om: self.om,
            w: self.w,
            ma: self.ma,
        }
    }

    /// Replace the geometric elements with a converted set (km), keeping the epoch.
    ///
    /// A catalog period is rescaled with Kepler's third law so that a changed
    /// semi-major axis changes the mean motion consistently.
    pub fn with_keplerian_km(&self, k: &Keplerian) -> Self {
        let a = k.a / AU_KM;
        let period_days = self.period_days.map(|p| p * (a / self.a).abs().powf(1.5));
        Self {
            a,
            e: k.e,
            i: k.i,
            om: wrap_two_pi(k.om),
            w: wrap_two_pi(k.w),
            ma: k.ma,
            epoch_jd: self.epoch_jd,
            period_days,
        }
    }

    /// Heliocentric state (km, km/s) implied by these elements.
    pub fn to_cartesian_km(&self, anomaly: AnomalyModel) -> Result<CartesianState, OrbitError> {
        keplerian_to_cartesian(&self.to_keplerian_km(), MU_SUN_KM3_S2, anomaly)
    }

    /// Element set fitted to a heliocentric state (km, km/s), keeping this set's epoch.
    pub fn with_cartesian_km(&self, state: &CartesianState) -> Result<Self, OrbitError> {
        let k = cartesian_to_keplerian(state, MU_SUN_KM3_S2)?;
        Ok(self.with_keplerian_km(&k))
    }
}

/// Orbital period (days) of a heliocentric orbit with semi-major axis `a_au`.
#[inline]
pub fn period_from_semi_major_axis(a_au: f64) -> f64 {
    KEPLER_YEAR_DAYS * a_au.powf(1.5)
}
