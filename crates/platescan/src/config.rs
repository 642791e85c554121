//! Run configuration.
//!
//! [`PlateConfig`] carries the grid geometry and display precision for one
//! run. [`AnalysisConfig`] bundles it with the calibration selection and the
//! annotation style so a whole analysis can be described in one JSON file.

use std::path::Path;

use crate::annotate::AnnotationStyle;
use crate::calibration::DEFAULT_CURVE;
use crate::error::{AnalysisError, Result};

const DEFAULT_ROWS: usize = 4;
const DEFAULT_COLS: usize = 6;
const DEFAULT_RADIUS_FRACTION: f64 = 0.2;
const DEFAULT_PRECISION: usize = 4;

/// Plate grid geometry and numeric precision.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlateConfig {
    /// Number of well rows.
    pub rows: usize,
    /// Number of well columns.
    pub cols: usize,
    /// Sampling radius as a fraction of the smaller cell side, in (0, 1].
    pub radius_fraction: f64,
    /// Significant decimal digits kept for gray values.
    pub precision: usize,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            radius_fraction: DEFAULT_RADIUS_FRACTION,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl PlateConfig {
    pub fn new(rows: usize, cols: usize, radius_fraction: f64, precision: usize) -> Self {
        Self {
            rows,
            cols,
            radius_fraction,
            precision,
        }
    }

    /// Number of wells on the plate.
    pub fn n_wells(&self) -> usize {
        self.rows * self.cols
    }

    /// Check the image-independent constraints.
    ///
    /// Image-dependent checks (non-empty sub-images) happen during
    /// partitioning.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(AnalysisError::config("rows", "must be >= 1"));
        }
        if self.cols == 0 {
            return Err(AnalysisError::config("cols", "must be >= 1"));
        }
        if !self.radius_fraction.is_finite()
            || self.radius_fraction <= 0.0
            || self.radius_fraction > 1.0
        {
            return Err(AnalysisError::config(
                "radius_fraction",
                format!("must be in (0, 1], got {}", self.radius_fraction),
            ));
        }
        if self.precision == 0 {
            return Err(AnalysisError::config("precision", "must be >= 1"));
        }
        Ok(())
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub plate: PlateConfig,
    /// Name of the built-in calibration curve.
    pub calibration: String,
    pub style: AnnotationStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            plate: PlateConfig::default(),
            calibration: DEFAULT_CURVE.to_string(),
            style: AnnotationStyle::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Guess `(rows, cols)` from a file name such as `plate_4x6.png` or `run-8*12.jpg`.
///
/// The first `*` in the stem is preferred as separator, otherwise the first
/// `x`. Digits immediately left of the separator give the row count, digits
/// immediately right give the column count.
pub fn guess_grid_from_filename(path: &Path) -> Option<(usize, usize)> {
    let stem = path.file_stem()?.to_str()?;
    let sep = stem.find('*').or_else(|| stem.find('x'))?;

    let before = &stem[..sep];
    let after = &stem[sep + 1..];

    let row_digits: String = {
        let mut rev: Vec<char> = before
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        rev.reverse();
        rev.into_iter().collect()
    };
    let col_digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();

    if row_digits.is_empty() || col_digits.is_empty() {
        return None;
    }

    let rows = row_digits.parse().ok()?;
    let cols = col_digits.parse().ok()?;
    Some((rows, cols))
}
