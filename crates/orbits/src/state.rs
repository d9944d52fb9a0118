//! Two-way conversion between Keplerian elements and Cartesian state vectors.
//!
//! The converter is unit-agnostic: lengths follow whatever unit the caller's
//! gravitational parameter uses (km with `MU_SUN_KM3_S2` everywhere in this
//! workspace).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use neo_core::matrix::{mul_vec, perifocal_to_inertial, transpose};
use neo_core::units::wrap_two_pi;
use neo_core::vector::{self, Vector3};

use crate::kepler::{self, KeplerSolver};
use crate::{OrbitError, ensure_finite, ensure_positive};

/// Eccentricities closer to 1 than this are treated as parabolic.
pub const PARABOLIC_TOLERANCE: f64 = 1.0e-8;
const CIRCULAR_TOLERANCE: f64 = 1.0e-12;
const EQUATORIAL_TOLERANCE: f64 = 1.0e-11;

/// Position/velocity pair in a consistent unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianState {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl CartesianState {
    /// Specific angular momentum `r × v`.
    pub fn angular_momentum(&self) -> Vector3 {
        vector::cross(&self.position, &self.velocity)
    }
}

/// Classical elements in the converter's length unit, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keplerian {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    pub om: f64,
    pub w: f64,
    pub ma: f64,
}

/// How the forward conversion turns the mean anomaly into a true anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyModel {
    /// Solve Kepler's equation; consistent with the inverse conversion.
    #[default]
    Exact,
    /// First-order shortcut `ν ≈ M` used by quick-look display code.
    MeanAsTrue,
}

/// Keplerian elements → Cartesian state.
pub fn keplerian_to_cartesian(
    elements: &Keplerian,
    mu: f64,
    anomaly: AnomalyModel,
) -> Result<CartesianState, OrbitError> {
    let mu = ensure_positive("gravitational parameter", mu)?;
    let a = ensure_positive("semi-major axis", elements.a)?;
    let e = ensure_finite("eccentricity", elements.e)?;
    if !(0.0..1.0).contains(&e) {
        return Err(OrbitError::EccentricityOutOfRange { eccentricity: e });
    }
    for (quantity, value) in [
        ("inclination", elements.i),
        ("ascending node", elements.om),
        ("argument of perihelion", elements.w),
        ("mean anomaly", elements.ma),
    ] {
        ensure_finite(quantity, value)?;
    }

    let nu = match anomaly {
        AnomalyModel::Exact => {
            let ea = KeplerSolver::precise().eccentric_anomaly(elements.ma, e)?;
            kepler::true_from_eccentric(ea, e)
        }
        AnomalyModel::MeanAsTrue => elements.ma,
    };

    let p = a * (1.0 - e * e);
    let (sin_nu, cos_nu) = nu.sin_cos();
    let r = p / (1.0 + e * cos_nu);
    let h = (mu * p).sqrt();

    let position_pf = [r * cos_nu, r * sin_nu, 0.0];
    let velocity_pf = [-mu / h * sin_nu, mu / h * (e + cos_nu), 0.0];

    let rotation = perifocal_to_inertial(elements.om, elements.i, elements.w);
    Ok(CartesianState {
        position: mul_vec(&rotation, &position_pf),
        velocity: mul_vec(&rotation, &velocity_pf),
    })
}

/// Cartesian state → classical elements.
///
/// Elliptical states yield `ma ∈ [0, 2π)`; hyperbolic states (`e > 1`) yield the
/// hyperbolic mean anomaly `e·sinh F − F` and a negative semi-major axis.
pub fn cartesian_to_keplerian(state: &CartesianState, mu: f64) -> Result<Keplerian, OrbitError> {
    let mu = ensure_positive("gravitational parameter", mu)?;
    let r_vec = state.position;
    let v_vec = state.velocity;
    if r_vec.iter().chain(v_vec.iter()).any(|c| !c.is_finite()) {
        return Err(OrbitError::NonFinite {
            quantity: "state vector",
        });
    }

    let r = vector::norm(&r_vec);
    if r == 0.0 {
        return Err(OrbitError::DegenerateState { vector: "position" });
    }
    let v = vector::norm(&v_vec);

    let h_vec = vector::cross(&r_vec, &v_vec);
    let h = vector::norm(&h_vec);
    if h == 0.0 {
        return Err(OrbitError::DegenerateState {
            vector: "angular momentum",
        });
    }

    let i = (h_vec[2] / h).clamp(-1.0, 1.0).acos();

    let n_vec = vector::cross(&[0.0, 0.0, 1.0], &h_vec);
    let n = vector::norm(&n_vec);
    let has_node = n > EQUATORIAL_TOLERANCE * h;

    let rv = vector::dot(&r_vec, &v_vec);
    let e_vec = vector::scale(
        &vector::sub(
            &vector::scale(&r_vec, v * v - mu / r),
            &vector::scale(&v_vec, rv),
        ),
        1.0 / mu,
    );
    let e = vector::norm(&e_vec);
    if (e - 1.0).abs() < PARABOLIC_TOLERANCE {
        return Err(OrbitError::NearParabolic { eccentricity: e });
    }

    let a = 1.0 / (2.0 / r - v * v / mu);

    let om = if has_node {
        let angle = (n_vec[0] / n).clamp(-1.0, 1.0).acos();
        if n_vec[1] < 0.0 { 2.0 * PI - angle } else { angle }
    } else {
        0.0
    };

    let w = if e > CIRCULAR_TOLERANCE {
        if has_node {
            let angle = (vector::dot(&n_vec, &e_vec) / (n * e)).clamp(-1.0, 1.0).acos();
            if e_vec[2] < 0.0 { 2.0 * PI - angle } else { angle }
        } else {
            // Equatorial: measure perihelion from the x axis. A retrograde
            // plane (i = π) mirrors y, so the quadrant test flips with h_z.
            let angle = (e_vec[0] / e).clamp(-1.0, 1.0).acos();
            let below = if h_vec[2] < 0.0 { e_vec[1] > 0.0 } else { e_vec[1] < 0.0 };
            if below { 2.0 * PI - angle } else { angle }
        }
    } else {
        0.0
    };

    let rotation = perifocal_to_inertial(om, i, w);
    let r_pf = mul_vec(&transpose(&rotation), &r_vec);
    let nu = wrap_two_pi(r_pf[1].atan2(r_pf[0]));

    let ma = if e < 1.0 {
        let ea = kepler::eccentric_from_true(nu, e);
        kepler::mean_from_eccentric(ea, e)
    } else {
        let cosh_f = ((e + nu.cos()) / (1.0 + e * nu.cos())).max(1.0);
        let magnitude = cosh_f.acosh();
        let f = if nu > PI { -magnitude } else { magnitude };
        e * f.sinh() - f
    };

    Ok(Keplerian {
        a,
        e,
        i,
        om: wrap_two_pi(om),
        w: wrap_two_pi(w),
        ma,
    })
}
