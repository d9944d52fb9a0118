//! Plumbing shared by the command-line tools.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use neo_deflect::config::{BodyRecord, Catalog, EngineSettings, load_catalog, load_settings};
use neo_deflect::{Body, Planet};

/// Catalog used when `--catalog` is not given.
pub const DEFAULT_CATALOG: &str = "data/catalog.yaml";

/// Initialise `env_logger` with an `info` default filter.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}

/// Engine settings from `path`, or the defaults.
pub fn engine_settings(path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    match path {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

pub fn catalog(path: &Path) -> anyhow::Result<Catalog> {
    load_catalog(path).with_context(|| format!("loading catalog from {}", path.display()))
}

/// Catalog entry by designation or name (case-insensitive).
pub fn find_record<'a>(catalog: &'a Catalog, key: &str) -> anyhow::Result<&'a BodyRecord> {
    catalog
        .find(key)
        .ok_or_else(|| anyhow::anyhow!("body '{key}' not found in catalog"))
}

/// A body to propagate: a major planet or a catalog entry.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub body: Body,
    pub record: Option<BodyRecord>,
}

/// Resolve `key` to a planet first, then to a catalog entry.
///
/// The catalog is only read when `key` is not a planet name.
pub fn resolve_target(catalog_path: &Path, key: &str) -> anyhow::Result<Target> {
    if let Ok(planet) = Planet::from_str(key) {
        return Ok(Target {
            label: planet.name().to_string(),
            body: planet.body(),
            record: None,
        });
    }
    let catalog = catalog(catalog_path)?;
    let record = find_record(&catalog, key)?;
    Ok(Target {
        label: describe(record),
        body: Body::from_elements(&record.elements()),
        record: Some(record.clone()),
    })
}

/// `Name (designation)` or the bare designation.
pub fn describe(record: &BodyRecord) -> String {
    match &record.name {
        Some(name) => format!("{name} ({})", record.designation),
        None => record.designation.clone(),
    }
}
