//! Seeded, parallel sampling of the covariance into heliocentric positions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::Serialize;

use neo_core::vector::{self, Vector3};
use neo_orbits::{Body, KeplerSolver, OrbitError, OrbitalElements};

use crate::UncertaintyError;
use crate::covariance::{CovarianceModel, ElementLabel};

/// Lower eccentricity bound applied to every draw.
pub const MIN_SAMPLED_ECCENTRICITY: f64 = 1e-6;
/// Upper eccentricity bound applied to every draw; keeps samples bound.
pub const MAX_SAMPLED_ECCENTRICITY: f64 = 0.999_999_9;

/// Heliocentric positions (AU) of every sample at `target_jd`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCloud {
    pub target_jd: f64,
    positions: Vec<Vector3>,
}

impl PointCloud {
    pub fn new(target_jd: f64, positions: Vec<Vector3>) -> Self {
        Self {
            target_jd,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Interleaved `x, y, z` buffer of length `3·len`, as consumed by renderers.
    pub fn to_f32_buffer(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| p.iter().map(|&c| c as f32))
            .collect()
    }

    pub fn centroid(&self) -> Option<Vector3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum = self
            .positions
            .iter()
            .fold(vector::ZERO, |acc, p| vector::add(&acc, p));
        Some(vector::scale(&sum, 1.0 / self.positions.len() as f64))
    }

    /// Root-mean-square distance of the samples from their centroid (AU).
    pub fn rms_spread(&self) -> Option<f64> {
        let centroid = self.centroid()?;
        let sum_sq: f64 = self
            .positions
            .iter()
            .map(|p| {
                let d = vector::distance(p, &centroid);
                d * d
            })
            .sum();
        Some((sum_sq / self.positions.len() as f64).sqrt())
    }
}

fn sample_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn draw_one(covariance: &CovarianceModel, seed: u64, index: usize) -> Vec<f64> {
    let mut rng = sample_rng(seed, index);
    let z: Vec<f64> = (0..covariance.dimension())
        .map(|_| rng.sample(StandardNormal))
        .collect();
    covariance.correlate(&z)
}

/// `n` correlated draws `nominal + L·z`, `z ~ N(0, I)`, in label order.
pub fn draw_samples(covariance: &CovarianceModel, n: usize, seed: u64) -> Vec<Vec<f64>> {
    (0..n)
        .into_par_iter()
        .map(|index| draw_one(covariance, seed, index))
        .collect()
}

/// Turn one draw into an element set.
///
/// Angles in the draw are degrees. Elements without a label keep their nominal
/// value; `a` comes from `q / (1 - e)` when `q` is sampled and positive. The
/// period is always re-derived from the sampled `a`.
pub fn sample_elements(
    covariance: &CovarianceModel,
    nominal: &OrbitalElements,
    draw: &[f64],
) -> OrbitalElements {
    let value = |label: ElementLabel| covariance.index_of(label).and_then(|k| draw.get(k).copied());
    let angle = |label: ElementLabel, fallback: f64| value(label).map_or(fallback, f64::to_radians);

    let e = value(ElementLabel::Eccentricity)
        .unwrap_or(nominal.e)
        .clamp(MIN_SAMPLED_ECCENTRICITY, MAX_SAMPLED_ECCENTRICITY);
    let a = match value(ElementLabel::PerihelionDistance) {
        Some(q) if q > 0.0 => q / (1.0 - e),
        _ => value(ElementLabel::SemiMajorAxis)
            .filter(|a| *a > 0.0)
            .unwrap_or(nominal.a),
    };

    OrbitalElements {
        a,
        e,
        i: angle(ElementLabel::Inclination, nominal.i),
        om: angle(ElementLabel::Node, nominal.om),
        w: angle(ElementLabel::Peri, nominal.w),
        ma: angle(ElementLabel::MeanAnomaly, nominal.ma),
        epoch_jd: nominal.epoch_jd,
        period_days: None,
    }
}

/// Propagate `n` covariance samples of `elements` to `target_jd`.
///
/// Fails with a domain error when no covariance is available. The same `seed`
/// always yields the same cloud.
pub fn sample_uncertainty_cloud(
    elements: &OrbitalElements,
    covariance: Option<&CovarianceModel>,
    n: usize,
    target_jd: f64,
    seed: u64,
    solver: &KeplerSolver,
) -> Result<PointCloud, UncertaintyError> {
    let covariance = covariance.ok_or(UncertaintyError::MissingCovariance)?;
    log::debug!(
        "sampling {n} draws over {} labels (seed {seed}) to JD {target_jd}",
        covariance.dimension()
    );

    let positions = (0..n)
        .into_par_iter()
        .map(|index| {
            let draw = draw_one(covariance, seed, index);
            let sampled = sample_elements(covariance, elements, &draw);
            Body::from_elements(&sampled).coordinates_at_jd(solver, target_jd)
        })
        .collect::<Result<Vec<_>, OrbitError>>()?;

    let cloud = PointCloud::new(target_jd, positions);
    if let Some(spread) = cloud.rms_spread() {
        log::info!("cloud of {} samples, rms spread {spread:.6e} AU", cloud.len());
    }
    Ok(cloud)
}
