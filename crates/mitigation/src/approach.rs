//! Encounter geometry between a deflected body and Earth.

use serde::Serialize;

use neo_core::constants::AU_KM;
use neo_core::vector::distance;
use neo_orbits::{Body, KeplerSolver, OrbitError};

use crate::MitigationError;

const GOLDEN: f64 = 0.618_033_988_749_894_8;
const REFINE_TOLERANCE_DAYS: f64 = 1e-6;
const MAX_REFINE_ITERATIONS: usize = 200;
const MAX_SCAN_POINTS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosestApproach {
    pub jd: f64,
    pub distance_km: f64,
}

/// Separation between `asteroid` and `earth` at `jd` (km).
pub fn miss_distance_km(
    asteroid: &Body,
    earth: &Body,
    solver: &KeplerSolver,
    jd: f64,
) -> Result<f64, OrbitError> {
    let a = asteroid.coordinates_at_jd(solver, jd)?;
    let e = earth.coordinates_at_jd(solver, jd)?;
    Ok(distance(&a, &e) * AU_KM)
}

/// Minimum separation inside `[start_jd, end_jd]`.
///
/// Scans on a `step_days` grid, then refines the bracket around the best grid
/// point with a golden-section search.
pub fn closest_approach(
    asteroid: &Body,
    earth: &Body,
    solver: &KeplerSolver,
    start_jd: f64,
    end_jd: f64,
    step_days: f64,
) -> Result<ClosestApproach, MitigationError> {
    if !(start_jd.is_finite() && end_jd.is_finite() && start_jd < end_jd) {
        return Err(MitigationError::InvalidWindow { start_jd, end_jd });
    }
    if !(step_days.is_finite() && step_days > 0.0) {
        return Err(MitigationError::InvalidStep(step_days));
    }

    let span = end_jd - start_jd;
    let intervals = ((span / step_days).ceil() as usize).clamp(1, MAX_SCAN_POINTS);
    let step = span / intervals as f64;
    let sample = |jd: f64| miss_distance_km(asteroid, earth, solver, jd);

    let mut best = ClosestApproach {
        jd: start_jd,
        distance_km: sample(start_jd)?,
    };
    let mut best_index = 0;
    for k in 1..=intervals {
        let jd = if k == intervals { end_jd } else { start_jd + k as f64 * step };
        let d = sample(jd)?;
        if d < best.distance_km {
            best = ClosestApproach { jd, distance_km: d };
            best_index = k;
        }
    }

    let mut lo = start_jd + best_index.saturating_sub(1) as f64 * step;
    let mut hi = (start_jd + (best_index + 1) as f64 * step).min(end_jd);
    let mut x1 = hi - GOLDEN * (hi - lo);
    let mut x2 = lo + GOLDEN * (hi - lo);
    let mut f1 = sample(x1)?;
    let mut f2 = sample(x2)?;
    let mut iterations = 0;
    while hi - lo > REFINE_TOLERANCE_DAYS && iterations < MAX_REFINE_ITERATIONS {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - GOLDEN * (hi - lo);
            f1 = sample(x1)?;
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + GOLDEN * (hi - lo);
            f2 = sample(x2)?;
        }
        iterations += 1;
    }
    let (jd, d) = if f1 < f2 { (x1, f1) } else { (x2, f2) };
    if d < best.distance_km {
        best = ClosestApproach { jd, distance_km: d };
    }

    log::debug!(
        "closest approach {:.1} km at JD {:.5} ({} grid points, {iterations} refinements)",
        best.distance_km,
        best.jd,
        intervals + 1
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo_orbits::OrbitalElements;

    fn apophis() -> Body {
        Body::from_elements(&OrbitalElements::from_degrees(
            0.9226, 0.1915, 3.3368, 204.043, 126.674, 268.84, 2_459_000.5, None,
        ))
    }

    #[test]
    fn body_has_zero_distance_to_itself() {
        let solver = KeplerSolver::precise();
        let d = miss_distance_km(&Body::EarthAnalytic, &Body::EarthAnalytic, &solver, 2_451_545.0)
            .unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn refined_minimum_beats_every_grid_sample() {
        let solver = KeplerSolver::precise();
        let asteroid = apophis();
        let earth = Body::EarthAnalytic;
        let (start, end) = (2_462_000.5, 2_462_400.5);
        let best = closest_approach(&asteroid, &earth, &solver, start, end, 5.0).unwrap();
        assert!(best.jd >= start && best.jd <= end);
        let mut jd = start;
        while jd <= end {
            let d = miss_distance_km(&asteroid, &earth, &solver, jd).unwrap();
            assert!(best.distance_km <= d + 1e-6, "JD {jd}: {d} < {}", best.distance_km);
            jd += 1.0;
        }
    }

    #[test]
    fn rejects_bad_windows() {
        let solver = KeplerSolver::default();
        let earth = Body::EarthAnalytic;
        let asteroid = apophis();
        assert!(matches!(
            closest_approach(&asteroid, &earth, &solver, 10.0, 10.0, 1.0),
            Err(MitigationError::InvalidWindow { .. })
        ));
        let err = closest_approach(&asteroid, &earth, &solver, 0.0, 10.0, 0.0).unwrap_err();
        assert_eq!(err, MitigationError::InvalidStep(0.0));
        assert_eq!(err.kind(), neo_orbits::ErrorKind::Domain);
    }
}
