//! Pure scoring functions.

use serde::Serialize;

use neo_core::units::kms_to_ms;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MitigationResult {
    /// 0 to 100.
    pub score: f64,
    /// `new - baseline` (km).
    pub improvement_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactAssessment {
    /// 0 to 100.
    pub score: f64,
    pub energy_component: f64,
    pub population_component: f64,
}

/// Score a change in miss distance relative to the baseline.
///
/// The score is the percentage improvement clamped to `[0, 100]`. A
/// non-positive baseline scores 100 for any improvement and 0 otherwise.
pub fn evaluate_mitigation(baseline_km: f64, new_km: f64) -> MitigationResult {
    let improvement_km = new_km - baseline_km;
    let score = if !improvement_km.is_finite() {
        0.0
    } else if baseline_km > 0.0 {
        (improvement_km / baseline_km * 100.0).clamp(0.0, 100.0)
    } else if improvement_km > 0.0 {
        100.0
    } else {
        0.0
    };
    MitigationResult {
        score,
        improvement_km,
    }
}

/// Severity of an impact from its energy (megatons TNT) and exposed population.
pub fn evaluate_impact(energy_mt: f64, population: f64) -> ImpactAssessment {
    let log_term = |value: f64, weight: f64| {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        ((value + 1.0).log10() * weight).min(100.0)
    };
    let energy_component = log_term(energy_mt, 20.0);
    let population_component = log_term(population, 10.0);
    ImpactAssessment {
        score: (energy_component + population_component).min(100.0),
        energy_component,
        population_component,
    }
}

/// First-order miss estimate: every m/s of delta-v adds one km.
pub fn linear_miss_estimate_km(baseline_km: f64, delta_v_km_s: f64) -> f64 {
    baseline_km + kms_to_ms(delta_v_km_s)
}
