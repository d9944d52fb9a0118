//! Engine-wide numerical settings, loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use neo_orbits::{AnomalyModel, KeplerSolver};
use neo_propulsion::{DEFAULT_ABLATION_EXHAUST_M_S, Integrator};

use crate::{ConfigError, check_positive};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub kepler: KeplerSettings,
    pub deflection: DeflectionSettings,
    pub uncertainty: UncertaintySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeplerSettings {
    pub tolerance_deg: f64,
    pub max_iterations: usize,
}

impl Default for KeplerSettings {
    fn default() -> Self {
        Self {
            tolerance_deg: KeplerSolver::DEFAULT_TOLERANCE_DEG,
            max_iterations: KeplerSolver::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeplerSettings {
    pub fn solver(&self) -> KeplerSolver {
        KeplerSolver::new(self.tolerance_deg, self.max_iterations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeflectionSettings {
    /// Integration step for sustained actions (s).
    pub step_s: f64,
    pub integrator: Integrator,
    pub anomaly: AnomalyModel,
    /// Ablation exhaust velocity used when a plan does not give one (m/s).
    pub exhaust_velocity_m_s: f64,
    /// Shorten the last sustained step to the remaining duration.
    pub truncate_final_step: bool,
}

impl Default for DeflectionSettings {
    fn default() -> Self {
        Self {
            step_s: 86_400.0,
            integrator: Integrator::Euler,
            anomaly: AnomalyModel::Exact,
            exhaust_velocity_m_s: DEFAULT_ABLATION_EXHAUST_M_S,
            truncate_final_step: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UncertaintySettings {
    pub samples: usize,
    /// Fixed seed; runs are reproducible only when set.
    pub seed: Option<u64>,
}

impl Default for UncertaintySettings {
    fn default() -> Self {
        Self {
            samples: 20_000,
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: EngineSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("kepler settings", "tolerance_deg", self.kepler.tolerance_deg)?;
        if self.kepler.max_iterations == 0 {
            return Err(ConfigError::invalid(
                "kepler settings",
                "max_iterations must be at least 1",
            ));
        }
        check_positive("deflection settings", "step_s", self.deflection.step_s)?;
        check_positive(
            "deflection settings",
            "exhaust_velocity_m_s",
            self.deflection.exhaust_velocity_m_s,
        )?;
        if self.uncertainty.samples == 0 {
            return Err(ConfigError::invalid(
                "uncertainty settings",
                "samples must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Load settings from a TOML file; missing tables and keys take their defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<EngineSettings, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    EngineSettings::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = EngineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.kepler.max_iterations, 100);
        assert_eq!(settings.deflection.step_s, 86_400.0);
        assert_eq!(settings.deflection.integrator, Integrator::Euler);
        assert_eq!(settings.deflection.anomaly, AnomalyModel::Exact);
        assert!(!settings.deflection.truncate_final_step);
        assert_eq!(settings.uncertainty.samples, 20_000);
        assert!(settings.uncertainty.seed.is_none());
    }

    #[test]
    fn partial_tables_override_selected_fields() {
        let settings = EngineSettings::from_toml_str(
            r#"
[kepler]
tolerance_deg = 1e-6

[deflection]
integrator = "rk4"
anomaly = "mean_as_true"
step_s = 3600.0
truncate_final_step = true

[uncertainty]
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(settings.kepler.max_iterations, 100);
        assert!((settings.kepler.solver().tolerance_deg() - 1e-6).abs() < 1e-18);
        assert_eq!(settings.deflection.integrator, Integrator::Rk4);
        assert_eq!(settings.deflection.anomaly, AnomalyModel::MeanAsTrue);
        assert!(settings.deflection.truncate_final_step);
        assert_eq!(settings.uncertainty.seed, Some(7));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            EngineSettings::from_toml_str("[kepler]\ntolerance = 1.0\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            EngineSettings::from_toml_str("[deflection]\nstep_s = 0.0\n"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EngineSettings::from_toml_str("[uncertainty]\nsamples = 0\n"),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
