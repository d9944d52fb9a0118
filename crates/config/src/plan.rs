//! Deflection plans: ordered action requests in user-facing units.

use std::path::Path;

use serde::{Deserialize, Serialize};

use neo_propulsion::ThrustDirection;

use crate::{ConfigError, load_records};

/// One requested action. Velocities in m/s, durations in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionConfig {
    #[serde(rename = "kinetic")]
    Kinetic {
        delta_v_m_s: f64,
        #[serde(default)]
        direction: ThrustDirection,
    },
    #[serde(rename = "manual_delta_v")]
    ManualDeltaV { delta_v_m_s: [f64; 3] },
    #[serde(rename = "gravity_tractor")]
    GravityTractor {
        spacecraft_mass_kg: f64,
        standoff_km: f64,
        duration_days: f64,
        #[serde(default)]
        direction: ThrustDirection,
    },
    #[serde(rename = "laser_ablation")]
    LaserAblation {
        power_mw: f64,
        efficiency: f64,
        duration_days: f64,
        /// Falls back to the catalog mass of the target body.
        #[serde(default)]
        asteroid_mass_kg: Option<f64>,
        #[serde(default)]
        exhaust_velocity_m_s: Option<f64>,
        #[serde(default)]
        direction: ThrustDirection,
    },
    #[serde(other)]
    Unsupported,
}

/// Load a plan (YAML list, single TOML action, or directory of TOML actions).
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Vec<ActionConfig>, ConfigError> {
    load_records(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_plan_parses_every_action_type() {
        let plan: Vec<ActionConfig> = serde_yaml::from_str(
            r#"
- type: kinetic
  delta_v_m_s: 1.5
  direction: alongVelocity
- type: manual_delta_v
  delta_v_m_s: [0.1, 0.0, -0.2]
- type: gravity_tractor
  spacecraft_mass_kg: 20000
  standoff_km: 0.2
  duration_days: 365
  direction: radial
- type: laser_ablation
  power_mw: 5
  efficiency: 0.4
  duration_days: 30
- type: nuclear
"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 5);
        assert!(matches!(
            plan[0],
            ActionConfig::Kinetic {
                direction: ThrustDirection::AlongVelocity,
                ..
            }
        ));
        assert!(matches!(
            plan[2],
            ActionConfig::GravityTractor {
                direction: ThrustDirection::Radial,
                ..
            }
        ));
        assert!(matches!(
            plan[3],
            ActionConfig::LaserAblation {
                asteroid_mass_kg: None,
                ..
            }
        ));
        assert_eq!(plan[4], ActionConfig::Unsupported);
    }
}
