//! Deflection session: the catalog record plus the caller's current override.

use serde::Serialize;

use neo_config::DeflectionSettings;
use neo_orbits::{Body, OrbitalElements};
use neo_propulsion::DeflectionAction;

use crate::{DeflectionError, DeflectionOutcome, apply_deflection};

/// Entry in a session's action log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedAction {
    pub action: DeflectionAction,
    pub delta_v_km_s: f64,
    pub before: OrbitalElements,
    pub after: OrbitalElements,
}

/// Tracks one body through a sequence of deflections.
///
/// The catalog element set is never modified; deflections replace the whole
/// current set, and [`DeflectionSession::reset`] returns to the catalog record.
#[derive(Debug, Clone)]
pub struct DeflectionSession {
    designation: String,
    catalog: OrbitalElements,
    current: Option<OrbitalElements>,
    settings: DeflectionSettings,
    history: Vec<AppliedAction>,
}

impl DeflectionSession {
    pub fn new(
        designation: impl Into<String>,
        catalog: OrbitalElements,
        settings: DeflectionSettings,
    ) -> Self {
        Self {
            designation: designation.into(),
            catalog,
            current: None,
            settings,
            history: Vec::new(),
        }
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn settings(&self) -> &DeflectionSettings {
        &self.settings
    }

    pub fn catalog_elements(&self) -> &OrbitalElements {
        &self.catalog
    }

    /// Elements in effect: the override if one was applied, else the catalog record.
    pub fn current_elements(&self) -> &OrbitalElements {
        self.current.as_ref().unwrap_or(&self.catalog)
    }

    pub fn is_modified(&self) -> bool {
        self.current.is_some()
    }

    /// Propagatable body for the current elements.
    pub fn body(&self) -> Body {
        Body::from_elements(self.current_elements())
    }

    /// Replace the current element set wholesale.
    pub fn apply_new_elements(&mut self, elements: OrbitalElements) {
        log::debug!(
            "{}: replacing elements (a {:.9} -> {:.9} AU)",
            self.designation,
            self.current_elements().a,
            elements.a
        );
        self.current = Some(elements);
    }

    /// Apply an action to the current elements. On error nothing changes.
    pub fn apply(&mut self, action: &DeflectionAction) -> Result<DeflectionOutcome, DeflectionError> {
        let before = *self.current_elements();
        let outcome = apply_deflection(&before, action, &self.settings)?;
        self.history.push(AppliedAction {
            action: *action,
            delta_v_km_s: outcome.delta_v_km_s,
            before,
            after: outcome.elements,
        });
        self.apply_new_elements(outcome.elements);
        Ok(outcome)
    }

    /// Discard every override and the action log.
    pub fn reset(&mut self) {
        log::debug!("{}: reset to catalog elements", self.designation);
        self.current = None;
        self.history.clear();
    }

    pub fn history(&self) -> &[AppliedAction] {
        &self.history
    }

    pub fn attempts(&self) -> usize {
        self.history.len()
    }

    /// Sum of the delta-v magnitudes of every applied action (km/s).
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.history.iter().map(|entry| entry.delta_v_km_s).sum()
    }
}
