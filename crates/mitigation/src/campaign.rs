//! Multi-attempt deflection campaign against a safe miss-distance window.

use serde::Serialize;

use crate::MitigationError;

/// Lower edge of the default safe window as a multiple of the baseline miss.
pub const SAFE_WINDOW_MIN_FACTOR: f64 = 1.5;
/// Upper edge of the default safe window as a multiple of the baseline miss.
pub const SAFE_WINDOW_MAX_FACTOR: f64 = 2.0;
/// Improvement (km) worth one point.
pub const KM_PER_POINT: f64 = 10_000.0;
pub const SUCCESS_BONUS: u64 = 1_000;
/// Efficiency bonus before the per-attempt penalty.
pub const EFFICIENCY_BASE: u64 = 100;
pub const EFFICIENCY_PENALTY_PER_ATTEMPT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignOutcome {
    /// Final miss distance inside the safe window.
    Success,
    /// Still too close.
    ImpactImminent,
    /// Pushed beyond the upper edge.
    OverDeflected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignResult {
    pub outcome: CampaignOutcome,
    pub final_miss_km: f64,
    pub attempts: u32,
    pub efficiency_bonus: u64,
    pub final_score: u64,
}

/// Running tally of deflection attempts.
///
/// Each attempt earns one point per 10 000 km gained over the previous miss
/// distance. A campaign that ends inside the window adds a fixed bonus and an
/// efficiency bonus that shrinks with every attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeflectionCampaign {
    baseline_km: f64,
    min_safe_km: f64,
    max_safe_km: f64,
    last_miss_km: f64,
    score: u64,
    attempts: u32,
}

impl DeflectionCampaign {
    /// Campaign with the default `[1.5, 2.0] × baseline` window.
    pub fn new(baseline_km: f64) -> Result<Self, MitigationError> {
        Self::with_window(
            baseline_km,
            baseline_km * SAFE_WINDOW_MIN_FACTOR,
            baseline_km * SAFE_WINDOW_MAX_FACTOR,
        )
    }

    pub fn with_window(
        baseline_km: f64,
        min_safe_km: f64,
        max_safe_km: f64,
    ) -> Result<Self, MitigationError> {
        let valid = baseline_km.is_finite()
            && baseline_km >= 0.0
            && min_safe_km.is_finite()
            && max_safe_km.is_finite()
            && min_safe_km <= max_safe_km;
        if !valid {
            return Err(MitigationError::InvalidThresholds {
                min_km: min_safe_km,
                max_km: max_safe_km,
            });
        }
        Ok(Self {
            baseline_km,
            min_safe_km,
            max_safe_km,
            last_miss_km: baseline_km,
            score: 0,
            attempts: 0,
        })
    }

    pub fn baseline_km(&self) -> f64 {
        self.baseline_km
    }

    pub fn safe_window_km(&self) -> (f64, f64) {
        (self.min_safe_km, self.max_safe_km)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_miss_km(&self) -> f64 {
        self.last_miss_km
    }

    /// Record the miss distance after an attempt; returns the points earned.
    pub fn record_attempt(&mut self, miss_km: f64) -> u64 {
        self.attempts += 1;
        let improvement = miss_km - self.last_miss_km;
        let points = if improvement.is_finite() && improvement > 0.0 {
            (improvement / KM_PER_POINT).floor() as u64
        } else {
            0
        };
        self.score += points;
        if miss_km.is_finite() {
            self.last_miss_km = miss_km;
        }
        log::debug!(
            "attempt {}: miss {miss_km:.1} km, +{points} points (total {})",
            self.attempts,
            self.score
        );
        points
    }

    pub fn outcome_for(&self, miss_km: f64) -> CampaignOutcome {
        if miss_km < self.min_safe_km || miss_km.is_nan() {
            CampaignOutcome::ImpactImminent
        } else if miss_km > self.max_safe_km {
            CampaignOutcome::OverDeflected
        } else {
            CampaignOutcome::Success
        }
    }

    pub fn efficiency_bonus(&self) -> u64 {
        EFFICIENCY_BASE
            .saturating_sub(EFFICIENCY_PENALTY_PER_ATTEMPT.saturating_mul(u64::from(self.attempts)))
    }

    /// Close the campaign at the final miss distance.
    pub fn finish(&self, final_miss_km: f64) -> CampaignResult {
        let outcome = self.outcome_for(final_miss_km);
        let (efficiency_bonus, final_score) = match outcome {
            CampaignOutcome::Success => {
                let bonus = self.efficiency_bonus();
                (bonus, self.score + SUCCESS_BONUS + bonus)
            }
            _ => (0, self.score),
        };
        CampaignResult {
            outcome,
            final_miss_km,
            attempts: self.attempts,
            efficiency_bonus,
            final_score,
        }
    }
}
