//! Calibration curves mapping gray difference to concentration.
//!
//! A curve is a degree-5 polynomial `P` fitted to six reference points of
//! `(gray_diff, log10 concentration)`. Concentration is `10^P(gray_diff)`,
//! except that a zero signal maps to exactly zero concentration.
//!
//! Curves are selected by name from a [`CalibrationCatalog`] and fitted once;
//! a [`CalibrationCurve`] value is immutable and is threaded explicitly
//! through the estimator.

mod polyfit;

pub use polyfit::{polyfit, polyval};

use crate::error::{AnalysisError, Result};
use crate::numfmt::format_general;

/// Polynomial degree of every calibration fit.
pub const CURVE_DEGREE: usize = 5;

/// Curve used when none is configured.
pub const DEFAULT_CURVE: &str = "miR-223";

const INDEX_POINTS: [f64; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

/// Built-in reference data: gray difference observed at each concentration index.
const BUILTIN_CURVES: &[(&str, [f64; 6])] = &[
    ("miR-223", [3.3, 12.33, 20.20, 45.0, 57.73, 64.67]),
    ("miR-935", [1.8, 12.3, 31.5, 50.7, 60.0, 66.1]),
    ("miR-2284W", [1.8, 17.27, 18.24, 52.0, 50.4, 60.5]),
];

/// Named reference point sets.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq)]
struct CatalogEntry {
    name: String,
    x_points: Vec<f64>,
    y_points: Vec<f64>,
}

impl Default for CalibrationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CalibrationCatalog {
    /// The built-in analyte curves.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CURVES
            .iter()
            .map(|(name, x)| CatalogEntry {
                name: (*name).to_string(),
                x_points: x.to_vec(),
                y_points: INDEX_POINTS.to_vec(),
            })
            .collect();
        Self { entries }
    }

    /// Add or replace a named point set.
    pub fn insert(&mut self, name: impl Into<String>, x_points: Vec<f64>, y_points: Vec<f64>) {
        let name = name.into();
        let entry = CatalogEntry {
            name,
            x_points,
            y_points,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    /// Curve names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Fit the curve registered under `name`.
    pub fn select(&self, name: &str) -> Result<CalibrationCurve> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AnalysisError::UnknownCalibration {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
        CalibrationCurve::fit(&entry.name, &entry.x_points, &entry.y_points)
    }
}

/// A fitted calibration curve.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CalibrationCurve {
    name: String,
    x_points: Vec<f64>,
    y_points: Vec<f64>,
    /// Highest power first.
    coefficients: Vec<f64>,
}

impl CalibrationCurve {
    /// Fit a degree-5 curve to caller-supplied points.
    pub fn fit(name: &str, x_points: &[f64], y_points: &[f64]) -> Result<Self> {
        if x_points.len() != y_points.len() {
            return Err(AnalysisError::calibration_fit(
                name,
                format!(
                    "{} signal points but {} concentration points",
                    x_points.len(),
                    y_points.len()
                ),
            ));
        }
        if x_points.len() < CURVE_DEGREE + 1 {
            return Err(AnalysisError::calibration_fit(
                name,
                format!(
                    "need at least {} points, got {}",
                    CURVE_DEGREE + 1,
                    x_points.len()
                ),
            ));
        }
        if x_points.iter().chain(y_points).any(|v| !v.is_finite()) {
            return Err(AnalysisError::calibration_fit(name, "non-finite point"));
        }

        let coefficients = polyfit(x_points, y_points, CURVE_DEGREE)
            .ok_or_else(|| AnalysisError::calibration_fit(name, "singular least-squares system"))?;

        tracing::debug!("fitted calibration curve {}", name);

        Ok(Self {
            name: name.to_string(),
            x_points: x_points.to_vec(),
            y_points: y_points.to_vec(),
            coefficients,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x_points(&self) -> &[f64] {
        &self.x_points
    }

    pub fn y_points(&self) -> &[f64] {
        &self.y_points
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// `P(gray_diff)`, the log10 concentration predicted by the polynomial.
    pub fn log10_at(&self, gray_diff: f64) -> f64 {
        polyval(&self.coefficients, gray_diff)
    }

    /// Concentration for `gray_diff`.
    ///
    /// Zero signal gives exactly `0.0` without evaluating the polynomial.
    /// Any non-zero signal gives a strictly positive finite value: results
    /// that underflow or overflow `f64` are clamped and logged.
    pub fn evaluate(&self, gray_diff: f64) -> f64 {
        if gray_diff == 0.0 {
            return 0.0;
        }
        let exponent = self.log10_at(gray_diff);
        let c = 10f64.powf(exponent);
        if c.is_infinite() {
            tracing::warn!(
                "{}: concentration 10^{} at gray diff {} overflows, clamped to f64::MAX",
                self.name,
                exponent,
                gray_diff
            );
            f64::MAX
        } else if !(c >= f64::MIN_POSITIVE) {
            tracing::warn!(
                "{}: concentration 10^{} at gray diff {} underflows, clamped to f64::MIN_POSITIVE",
                self.name,
                exponent,
                gray_diff
            );
            f64::MIN_POSITIVE
        } else {
            c
        }
    }

    /// Human-readable polynomial, three significant digits per coefficient:
    /// `P(x) = 1.2e-06*x^5 - 0.000213*x^4 + ... + 0.5`.
    pub fn expression(&self) -> String {
        let degree = self.coefficients.len().saturating_sub(1);
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let coef = format_general(c, 3);
                match degree - i {
                    0 => coef,
                    1 => format!("{coef}*x"),
                    p => format!("{coef}*x^{p}"),
                }
            })
            .collect();
        format!("P(x) = {}", terms.join(" + ").replace("+ -", "- "))
    }
}
