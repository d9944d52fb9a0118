//! Small-body catalog records and the lookup registry built from them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use neo_orbits::OrbitalElements;

use crate::{ConfigError, check_finite, check_positive, load_records};

/// One body as delivered by an orbit-determination catalog. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub designation: String,
    #[serde(default)]
    pub name: Option<String>,
    pub epoch_jd: f64,
    /// Semi-major axis (AU).
    pub a: f64,
    pub e: f64,
    pub i: f64,
    #[serde(alias = "om")]
    pub node: f64,
    #[serde(alias = "w")]
    pub peri: f64,
    #[serde(rename = "M", alias = "ma")]
    pub mean_anomaly: f64,
    /// Perihelion distance (AU).
    #[serde(default)]
    pub q: Option<f64>,
    #[serde(default)]
    pub period_days: Option<f64>,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    #[serde(default)]
    pub diameter_m: Option<f64>,
    #[serde(default)]
    pub covariance: Option<CovarianceRecord>,
}

/// Covariance block: labels, optional nominal vector and lower-triangular Cholesky factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceRecord {
    pub labels: Vec<String>,
    #[serde(default)]
    pub nominal: Option<Vec<f64>>,
    pub cholesky: Vec<Vec<f64>>,
}

impl BodyRecord {
    /// Display label: the name when present, otherwise the designation.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.designation)
    }

    /// Osculating element set (radians) at the record epoch.
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::from_degrees(
            self.a,
            self.e,
            self.i,
            self.node,
            self.peri,
            self.mean_anomaly,
            self.epoch_jd,
            self.period_days,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let context = format!("catalog entry '{}'", self.designation);
        if self.designation.trim().is_empty() {
            return Err(ConfigError::invalid("catalog entry", "designation is empty"));
        }
        check_finite(&context, "epoch_jd", self.epoch_jd)?;
        check_positive(&context, "a", self.a)?;
        if !(0.0..1.0).contains(&self.e) {
            return Err(ConfigError::invalid(
                &context,
                format!("e must lie in [0, 1) (got {})", self.e),
            ));
        }
        for (field, value) in [
            ("i", self.i),
            ("node", self.node),
            ("peri", self.peri),
            ("M", self.mean_anomaly),
        ] {
            check_finite(&context, field, value)?;
        }
        for (field, value) in [
            ("q", self.q),
            ("period_days", self.period_days),
            ("mass_kg", self.mass_kg),
            ("diameter_m", self.diameter_m),
        ] {
            if let Some(value) = value {
                check_positive(&context, field, value)?;
            }
        }
        if let Some(cov) = &self.covariance {
            cov.validate(&context)?;
        }
        Ok(())
    }
}

impl CovarianceRecord {
    pub fn dimension(&self) -> usize {
        self.labels.len()
    }

    pub fn validate(&self, context: &str) -> Result<(), ConfigError> {
        let n = self.dimension();
        if n == 0 {
            return Err(ConfigError::invalid(context, "covariance has no labels"));
        }
        // Rows may be stored full or trimmed to the lower triangle.
        let ragged = self
            .cholesky
            .iter()
            .enumerate()
            .any(|(r, row)| row.len() <= r || row.len() > n);
        if self.cholesky.len() != n || ragged {
            return Err(ConfigError::invalid(
                context,
                format!("cholesky factor must have {n} lower-triangular rows to match the labels"),
            ));
        }
        if let Some(nominal) = &self.nominal {
            if nominal.len() != n {
                return Err(ConfigError::invalid(
                    context,
                    format!("nominal vector has {} entries, expected {n}", nominal.len()),
                ));
            }
        }
        if self.cholesky.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid(context, "cholesky factor contains non-finite values"));
        }
        Ok(())
    }
}

/// Explicit lookup registry over catalog records.
///
/// Keys are case-insensitive and cover both designations and names.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<BodyRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(records: Vec<BodyRecord>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(records.len() * 2);
        for (slot, record) in records.iter().enumerate() {
            record.validate()?;
            let key = record.designation.trim().to_lowercase();
            if index.insert(key, slot).is_some() {
                return Err(ConfigError::Duplicate(record.designation.clone()));
            }
        }
        for (slot, record) in records.iter().enumerate() {
            if let Some(name) = &record.name {
                index.entry(name.trim().to_lowercase()).or_insert(slot);
            }
        }
        Ok(Self { records, index })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let records = load_records(path)?;
        Self::new(records)
    }

    pub fn find(&self, key: &str) -> Option<&BodyRecord> {
        self.index
            .get(&key.trim().to_lowercase())
            .map(|&slot| &self.records[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load and validate a catalog from YAML, TOML or a directory of TOML files.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, ConfigError> {
    Catalog::load(path)
}
