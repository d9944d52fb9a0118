//! Heliocentric bodies evaluated from low-order analytic element tables.
//!
//! `d` is always days elapsed since JD 2451543.5 (see
//! [`neo_core::time::jd_to_day_offset`]); positions are returned in AU in the
//! heliocentric ecliptic frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use neo_core::constants::{KEPLER_YEAR_DAYS, REFERENCE_EPOCH_JD};
use neo_core::matrix::{mul_vec, perifocal_to_inertial};
use neo_core::units::wrap_degrees;
use neo_core::vector::Vector3;

use crate::elements::OrbitalElements;
use crate::kepler::KeplerSolver;
use crate::{OrbitError, ensure_finite, ensure_positive};

/// A value that drifts linearly with time: `base + per_day·d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub base: f64,
    pub per_day: f64,
}

impl Rate {
    pub const fn new(base: f64, per_day: f64) -> Self {
        Self { base, per_day }
    }

    pub const fn fixed(base: f64) -> Self {
        Self { base, per_day: 0.0 }
    }

    #[inline]
    pub fn at(&self, d: f64) -> f64 {
        self.base + self.per_day * d
    }
}

/// Secular element set. Angles in degrees, `a` in AU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecularElements {
    pub raan: Rate,
    pub inclination: Rate,
    pub arg_perihelion: Rate,
    pub semi_major_axis: Rate,
    pub eccentricity: Rate,
    pub mean_anomaly: Rate,
    /// Catalog period (days); derived from `a` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_days: Option<f64>,
}

/// Instantaneous angles (degrees) and shape of a [`SecularElements`] set at `d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementsAt {
    pub raan_deg: f64,
    pub inclination_deg: f64,
    pub arg_perihelion_deg: f64,
    pub a: f64,
    pub e: f64,
    pub mean_anomaly_deg: f64,
}

impl SecularElements {
    /// Freeze an osculating element set into a drift-free secular set.
    ///
    /// The mean anomaly at the epoch is wound back to the reference epoch using
    /// the mean motion `360/P`; every other element is held constant.
    pub fn from_osculating(elements: &OrbitalElements) -> Self {
        let period = elements.period();
        let n = 360.0 / period;
        let day = elements.epoch_jd - REFERENCE_EPOCH_JD;
        let m0 = wrap_degrees(elements.ma.to_degrees() - n * day);
        Self {
            raan: Rate::fixed(elements.om.to_degrees()),
            inclination: Rate::fixed(elements.i.to_degrees()),
            arg_perihelion: Rate::fixed(elements.w.to_degrees()),
            semi_major_axis: Rate::fixed(elements.a),
            eccentricity: Rate::fixed(elements.e),
            mean_anomaly: Rate::new(m0, n),
            period_days: elements.period_days.or(Some(period)),
        }
    }

    /// Orbital period (days).
    pub fn period_days(&self) -> f64 {
        self.period_days
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or_else(|| KEPLER_YEAR_DAYS * self.semi_major_axis.base.abs().powf(1.5))
    }

    /// Mean motion (degrees per day).
    pub fn mean_motion_deg_per_day(&self) -> f64 {
        360.0 / self.period_days()
    }

    pub fn at(&self, d: f64) -> ElementsAt {
        ElementsAt {
            raan_deg: wrap_degrees(self.raan.at(d)),
            inclination_deg: wrap_degrees(self.inclination.at(d)),
            arg_perihelion_deg: wrap_degrees(self.arg_perihelion.at(d)),
            a: self.semi_major_axis.at(d),
            e: self.eccentricity.at(d),
            mean_anomaly_deg: wrap_degrees(self.mean_anomaly.at(d)),
        }
    }

    /// Heliocentric ecliptic position (AU) at day offset `d`.
    pub fn coordinates_with(&self, solver: &KeplerSolver, d: f64) -> Result<Vector3, OrbitError> {
        let d = ensure_finite("day offset", d)?;
        let el = self.at(d);
        let a = ensure_positive("semi-major axis", el.a)?;

        let ea = solver.eccentric_anomaly(el.mean_anomaly_deg.to_radians(), el.e)?;
        let (sin_e, cos_e) = ea.sin_cos();
        let perifocal = [
            a * (cos_e - el.e),
            a * (1.0 - el.e * el.e).sqrt() * sin_e,
            0.0,
        ];
        let rotation = perifocal_to_inertial(
            el.raan_deg.to_radians(),
            el.inclination_deg.to_radians(),
            el.arg_perihelion_deg.to_radians(),
        );
        Ok(mul_vec(&rotation, &perifocal))
    }
}

/// Something with a heliocentric position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Body {
    /// Generic body propagated with Kepler's equation.
    Keplerian(SecularElements),
    /// Earth from the closed-form solar position series.
    EarthAnalytic,
}

impl Body {
    /// Asteroid-class body from a catalog element set.
    pub fn from_elements(elements: &OrbitalElements) -> Self {
        Body::Keplerian(SecularElements::from_osculating(elements))
    }

    /// Position (AU) at day offset `d` with the default solver.
    pub fn coordinates(&self, d: f64) -> Result<Vector3, OrbitError> {
        self.coordinates_with(&KeplerSolver::default(), d)
    }

    pub fn coordinates_with(&self, solver: &KeplerSolver, d: f64) -> Result<Vector3, OrbitError> {
        match self {
            Body::Keplerian(elements) => elements.coordinates_with(solver, d),
            Body::EarthAnalytic => earth_coordinates(d),
        }
    }

    /// Position (AU) at a Julian Date.
    pub fn coordinates_at_jd(&self, solver: &KeplerSolver, jd: f64) -> Result<Vector3, OrbitError> {
        self.coordinates_with(solver, jd - REFERENCE_EPOCH_JD)
    }

    pub fn period_days(&self) -> f64 {
        match self {
            Body::Keplerian(elements) => elements.period_days(),
            Body::EarthAnalytic => KEPLER_YEAR_DAYS,
        }
    }

    /// Day offset of the perihelion passage nearest the reference epoch, if any.
    pub fn perihelion_day(&self) -> Option<f64> {
        match self {
            Body::Keplerian(elements) => Some(perihelion_day(
                elements.mean_anomaly.base,
                elements.period_days(),
            )),
            Body::EarthAnalytic => None,
        }
    }
}

/// Day offset at which the mean anomaly `m0_deg` (valid at `d = 0`) reaches zero.
pub fn perihelion_day(m0_deg: f64, period_days: f64) -> f64 {
    -m0_deg / (360.0 / period_days)
}

/// One period of positions ending at `d`, oldest first.
///
/// Returns `samples + 1` evenly spaced points; for bodies with a perihelion the
/// perihelion position is spliced in at its chronological place when it falls
/// inside the sampled window.
pub fn orbit_path(
    body: &Body,
    solver: &KeplerSolver,
    d: f64,
    samples: usize,
) -> Result<Vec<Vector3>, OrbitError> {
    if samples == 0 {
        return Err(OrbitError::InvalidParameter {
            quantity: "orbit path samples",
            value: 0.0,
        });
    }
    let period = ensure_positive("orbital period", body.period_days())?;
    let step = period / samples as f64;
    let start = d - period;

    let mut days: Vec<f64> = (0..=samples).map(|k| start + step * k as f64).collect();
    if let Some(peri) = body.perihelion_day() {
        // Shift onto the sampled revolution before splicing.
        let shift = ((d - peri) / period).floor();
        let peri = peri + shift * period;
        if peri > start && peri < d && !days.iter().any(|t| (t - peri).abs() < 1e-9) {
            let index = days.partition_point(|t| *t < peri);
            days.insert(index, peri);
        }
    }

    days.into_iter()
        .map(|t| body.coordinates_with(solver, t))
        .collect()
}

fn earth_coordinates(d: f64) -> Result<Vector3, OrbitError> {
    let d = ensure_finite("day offset", d)? - 1.5;
    let t = d / 36_525.0;

    let l0 = 280.466_45 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m0 = 357.529_10 + 35_999.050_30 * t - 0.000_155_9 * t * t - 0.000_000_48 * t * t * t;
    let m0_rad = m0.to_radians();
    let c = (1.914_600 - 0.004_817 * t - 0.000_014 * t * t) * m0_rad.sin()
        + (0.019_93 - 0.000_101 * t) * (2.0 * m0_rad).sin()
        + 0.000_290 * (3.0 * m0_rad).sin();
    let sun_longitude = (l0 + c).to_radians();
    let e = 0.016_708_617 - t * (0.000_042_037 + 0.000_000_123_6 * t);
    let distance = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * (m0 + c).to_radians().cos());

    Ok([
        -distance * sun_longitude.cos(),
        -distance * sun_longitude.sin(),
        0.0,
    ])
}

/// Major planets with built-in secular element tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        }
    }

    pub fn body(self) -> Body {
        let table = |raan: Rate, inclination: Rate, arg_perihelion: Rate, a: Rate, e: Rate, m: Rate| {
            Body::Keplerian(SecularElements {
                raan,
                inclination,
                arg_perihelion,
                semi_major_axis: a,
                eccentricity: e,
                mean_anomaly: m,
                period_days: None,
            })
        };
        match self {
            Planet::Mercury => table(
                Rate::new(48.3313, 3.245_87e-5),
                Rate::new(7.0047, 5.00e-8),
                Rate::new(29.1241, 1.014_44e-5),
                Rate::fixed(0.387_098),
                Rate::new(0.205_635, 5.59e-10),
                Rate::new(168.6562, 4.092_334_436_8),
            ),
            Planet::Venus => table(
                Rate::new(76.6799, 2.465_90e-5),
                Rate::new(3.3946, 2.75e-8),
                Rate::new(54.8910, 1.383_74e-5),
                Rate::fixed(0.723_330),
                Rate::new(0.006_773, -1.302e-9),
                Rate::new(48.0052, 1.602_130_224_4),
            ),
            Planet::Earth => Body::EarthAnalytic,
            Planet::Mars => table(
                Rate::new(49.5574, 2.110_81e-5),
                Rate::new(1.8497, -1.78e-8),
                Rate::new(286.5016, 2.929_61e-5),
                Rate::fixed(1.523_688),
                Rate::new(0.093_405, 2.516e-9),
                Rate::new(18.6021, 0.524_020_776_6),
            ),
            Planet::Jupiter => table(
                Rate::new(100.4542, 2.768_54e-5),
                Rate::new(1.3030, -1.557e-7),
                Rate::new(273.8777, 1.645_05e-5),
                Rate::fixed(5.202_56),
                Rate::new(0.048_498, 4.469e-9),
                Rate::new(19.8950, 0.083_085_300_1),
            ),
            Planet::Saturn => table(
                Rate::new(113.6634, 2.389_80e-5),
                Rate::new(2.4886, -1.081e-7),
                Rate::new(339.3939, 2.976_61e-5),
                Rate::fixed(9.554_75),
                Rate::new(0.055_546, -9.499e-9),
                Rate::new(316.9670, 0.033_444_228_2),
            ),
            Planet::Uranus => table(
                Rate::new(74.0005, 1.3978e-5),
                Rate::new(0.7733, 1.9e-8),
                Rate::new(96.6612, 3.0565e-5),
                Rate::new(19.181_71, -1.55e-8),
                Rate::new(0.047_318, 7.45e-9),
                Rate::new(142.5905, 0.011_725_806),
            ),
            Planet::Neptune => table(
                Rate::new(131.7806, 3.0173e-5),
                Rate::new(1.7700, -2.55e-7),
                Rate::new(272.8461, 6.027e-6),
                Rate::new(30.058_26, 3.313e-8),
                Rate::new(0.008_606, 2.15e-9),
                Rate::new(260.2471, 0.005_995_147),
            ),
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Planet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Planet::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown planet '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use neo_core::constants::J2000_JD;
    use neo_core::vector::norm;

    #[test]
    fn earth_at_j2000_matches_solar_series() {
        let d = J2000_JD - REFERENCE_EPOCH_JD;
        let r = Body::EarthAnalytic.coordinates(d).unwrap();
        assert_relative_eq!(norm(&r), 0.9833, epsilon = 1e-3);
        assert_relative_eq!(r[0], -0.1772, epsilon = 2e-3);
        assert_relative_eq!(r[1], 0.9672, epsilon = 2e-3);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn earth_distance_stays_within_orbit_bounds() {
        for k in 0..73 {
            let r = Body::EarthAnalytic.coordinates(k as f64 * 5.0).unwrap();
            let dist = norm(&r);
            assert!((0.98..1.02).contains(&dist), "day {} dist {dist}", k * 5);
        }
    }

    #[test]
    fn planets_sit_near_their_semi_major_axes() {
        for planet in Planet::ALL {
            let body = planet.body();
            let Body::Keplerian(el) = body else {
                continue;
            };
            let a = el.semi_major_axis.base;
            let e = el.eccentricity.base;
            let r = norm(&body.coordinates(1_000.0).unwrap());
            assert!(
                r >= a * (1.0 - e) - 1e-3 && r <= a * (1.0 + e) + 1e-3,
                "{planet}: r = {r}, a = {a}"
            );
        }
    }

    #[test]
    fn asteroid_returns_to_epoch_position_after_one_period() {
        let el = OrbitalElements::from_degrees(
            1.458, 0.2227, 10.83, 304.3, 178.9, 246.9, 2_459_000.5, None,
        );
        let body = Body::from_elements(&el);
        let solver = KeplerSolver::precise();
        let d0 = el.epoch_jd - REFERENCE_EPOCH_JD;
        let p0 = body.coordinates_with(&solver, d0).unwrap();
        let p1 = body.coordinates_with(&solver, d0 + body.period_days()).unwrap();
        for k in 0..3 {
            assert_relative_eq!(p0[k], p1[k], epsilon = 1e-8);
        }
    }

    #[test]
    fn secular_position_matches_state_converter() {
        use crate::state::{AnomalyModel, keplerian_to_cartesian};
        use neo_core::constants::{AU_KM, MU_SUN_KM3_S2};

        let el = OrbitalElements::from_degrees(
            1.2, 0.3, 12.0, 80.0, 40.0, 100.0, 2_460_000.5, None,
        );
        let body = Body::from_elements(&el);
        let from_body = body
            .coordinates_at_jd(&KeplerSolver::precise(), el.epoch_jd)
            .unwrap();
        let state =
            keplerian_to_cartesian(&el.to_keplerian_km(), MU_SUN_KM3_S2, AnomalyModel::Exact).unwrap();
        for k in 0..3 {
            assert_relative_eq!(from_body[k], state.position[k] / AU_KM, epsilon = 1e-8);
        }
    }

    #[test]
    fn hyperbolic_elements_are_a_domain_error() {
        let el = OrbitalElements::from_degrees(2.0, 1.1, 5.0, 0.0, 0.0, 0.0, 2_451_545.0, Some(500.0));
        let err = Body::from_elements(&el).coordinates(0.0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
    }

    #[test]
    fn orbit_path_covers_one_revolution_with_perihelion() {
        let el = OrbitalElements::from_degrees(1.0, 0.5, 0.0, 0.0, 0.0, 90.0, REFERENCE_EPOCH_JD, Some(360.0));
        let body = Body::from_elements(&el);
        let path = orbit_path(&body, &KeplerSolver::precise(), 100.0, 50).unwrap();
        assert_eq!(path.len(), 52);
        let closest = path.iter().map(norm).fold(f64::INFINITY, f64::min);
        assert_relative_eq!(closest, el.perihelion_distance(), epsilon = 1e-9);
        assert!(orbit_path(&body, &KeplerSolver::default(), 0.0, 0).is_err());
    }

    #[test]
    fn perihelion_day_inverts_mean_motion() {
        assert_relative_eq!(perihelion_day(90.0, 360.0), -90.0);
        assert_eq!("mars".parse::<Planet>().unwrap(), Planet::Mars);
        assert!("pluto".parse::<Planet>().is_err());
    }
}
