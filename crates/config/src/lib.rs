//! Configuration models and loaders for the NEO deflection engine.

pub mod catalog;
pub mod plan;
pub mod settings;

pub use catalog::{BodyRecord, Catalog, CovarianceRecord, load_catalog};
pub use plan::{ActionConfig, load_plan};
pub use settings::{
    DeflectionSettings, EngineSettings, KeplerSettings, UncertaintySettings, load_settings,
};

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Failures while reading catalogs, plans or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid {context}: {reason}")]
    Invalid { context: String, reason: String },
    #[error("duplicate catalog entry '{0}'")]
    Duplicate(String),
}

impl ConfigError {
    pub(crate) fn invalid(context: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Load a list of records from a YAML file, a single TOML file, or a directory of TOML files.
pub(crate) fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        log::debug!("loading record from {}", path.display());
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn check_finite(context: &str, field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(context, format!("{field} must be finite")))
    }
}

pub(crate) fn check_positive(context: &str, field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            context,
            format!("{field} must be positive (got {value})"),
        ))
    }
}
