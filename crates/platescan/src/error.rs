//! Error types for plate analysis.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fatal analysis failures.
///
/// Every variant aborts the run: no partial report is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Plate configuration is invalid for the given image.
    #[error("invalid configuration: {parameter} {reason}")]
    Config { parameter: String, reason: String },

    /// Requested calibration curve is not part of the catalog.
    #[error("unknown calibration curve '{name}' (available: {available})")]
    UnknownCalibration { name: String, available: String },

    /// A well's sampling rectangle collapsed after clamping.
    #[error("degenerate sample rectangle for well ({row}, {col}): {width}x{height} px")]
    SampleExtraction {
        row: usize,
        col: usize,
        width: u32,
        height: u32,
    },

    /// Polynomial fit of calibration points failed.
    #[error("calibration fit failed for '{name}': {reason}")]
    CalibrationFit { name: String, reason: String },
}

impl AnalysisError {
    pub(crate) fn config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn calibration_fit(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CalibrationFit {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal failure reported by an export collaborator.
///
/// The in-memory report stays valid when persistence fails.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExportWarning {
    /// Which artifact could not be written (e.g. `"mosaic"`).
    pub artifact: String,
    /// Collaborator-provided failure description.
    pub message: String,
}

impl std::fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to export {}: {}", self.artifact, self.message)
    }
}
