//! Covariance model: labelled nominal vector with a lower-triangular Cholesky factor.

use std::str::FromStr;

use neo_config::CovarianceRecord;
use neo_orbits::OrbitalElements;

use crate::UncertaintyError;

/// Element a covariance label refers to. Angles are in degrees, distances in AU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementLabel {
    Eccentricity,
    PerihelionDistance,
    Node,
    Peri,
    Inclination,
    MeanAnomaly,
    SemiMajorAxis,
}

impl ElementLabel {
    /// Nominal value of this element for an element set.
    pub fn nominal(self, elements: &OrbitalElements, q: Option<f64>) -> f64 {
        match self {
            ElementLabel::Eccentricity => elements.e,
            ElementLabel::PerihelionDistance => q.unwrap_or_else(|| elements.perihelion_distance()),
            ElementLabel::Node => elements.om.to_degrees(),
            ElementLabel::Peri => elements.w.to_degrees(),
            ElementLabel::Inclination => elements.i.to_degrees(),
            ElementLabel::MeanAnomaly => elements.ma.to_degrees(),
            ElementLabel::SemiMajorAxis => elements.a,
        }
    }
}

impl FromStr for ElementLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "e" => Ok(ElementLabel::Eccentricity),
            "q" => Ok(ElementLabel::PerihelionDistance),
            "node" | "om" => Ok(ElementLabel::Node),
            "peri" | "w" => Ok(ElementLabel::Peri),
            "i" => Ok(ElementLabel::Inclination),
            "M" | "ma" => Ok(ElementLabel::MeanAnomaly),
            "a" => Ok(ElementLabel::SemiMajorAxis),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceModel {
    labels: Vec<String>,
    elements: Vec<Option<ElementLabel>>,
    nominal: Vec<f64>,
    /// Square, zero above the diagonal.
    cholesky: Vec<Vec<f64>>,
}

impl CovarianceModel {
    /// Build a model; `cholesky` rows may be full or trimmed to the lower triangle.
    pub fn new(
        labels: Vec<String>,
        nominal: Vec<f64>,
        cholesky: Vec<Vec<f64>>,
    ) -> Result<Self, UncertaintyError> {
        let n = labels.len();
        let invalid = |reason: String| Err(UncertaintyError::InvalidCovariance(reason));
        if n == 0 {
            return invalid("no labels".into());
        }
        if nominal.len() != n {
            return invalid(format!("{} nominal values for {n} labels", nominal.len()));
        }
        if nominal.iter().any(|v| !v.is_finite()) {
            return invalid("nominal vector contains non-finite values".into());
        }
        if cholesky.len() != n {
            return invalid(format!("{} factor rows for {n} labels", cholesky.len()));
        }

        let mut square = Vec::with_capacity(n);
        for (r, row) in cholesky.into_iter().enumerate() {
            if row.len() <= r || row.len() > n {
                return invalid(format!("row {r} has {} entries", row.len()));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return invalid(format!("row {r} contains non-finite values"));
            }
            if row.iter().skip(r + 1).any(|v| *v != 0.0) {
                return invalid(format!("row {r} has entries above the diagonal"));
            }
            let mut padded = row;
            padded.resize(n, 0.0);
            square.push(padded);
        }

        let elements: Vec<Option<ElementLabel>> =
            labels.iter().map(|label| label.parse().ok()).collect();
        for (label, element) in labels.iter().zip(&elements) {
            if element.is_none() {
                log::debug!("covariance label '{label}' is sampled but not mapped to an element");
            }
        }

        Ok(Self {
            labels,
            elements,
            nominal,
            cholesky: square,
        })
    }

    /// Build a model from a catalog block, taking missing nominals from `elements`.
    pub fn from_record(
        record: &CovarianceRecord,
        elements: &OrbitalElements,
        q: Option<f64>,
    ) -> Result<Self, UncertaintyError> {
        let nominal = match &record.nominal {
            Some(values) => values.clone(),
            None => record
                .labels
                .iter()
                .map(|label| match label.parse::<ElementLabel>() {
                    Ok(element) => element.nominal(elements, q),
                    Err(()) => {
                        log::warn!("no nominal value for covariance label '{label}'; using 0");
                        0.0
                    }
                })
                .collect(),
        };
        Self::new(record.labels.clone(), nominal, record.cholesky.clone())
    }

    pub fn dimension(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn nominal(&self) -> &[f64] {
        &self.nominal
    }

    pub fn cholesky(&self) -> &[Vec<f64>] {
        &self.cholesky
    }

    /// Position of `element` in the sampled vector, if it is covered.
    pub fn index_of(&self, element: ElementLabel) -> Option<usize> {
        self.elements.iter().position(|e| *e == Some(element))
    }

    /// One-sigma marginal of every component: `sqrt(Σ_c L[r][c]²)`.
    pub fn marginal_sigmas(&self) -> Vec<f64> {
        self.cholesky
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect()
    }

    /// Map a standard-normal vector to a correlated draw `nominal + L·z`.
    pub fn correlate(&self, z: &[f64]) -> Vec<f64> {
        self.cholesky
            .iter()
            .zip(&self.nominal)
            .enumerate()
            .map(|(r, (row, mu))| {
                mu + row
                    .iter()
                    .zip(z)
                    .take(r + 1)
                    .map(|(l, zc)| l * zc)
                    .sum::<f64>()
            })
            .collect()
    }
}
