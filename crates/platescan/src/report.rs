//! Report assembly: matrices, mosaic, records.

use image::{imageops, Rgb, RgbImage};

use crate::calibration::CalibrationCurve;
use crate::config::PlateConfig;
use crate::grid::{PlateGrid, WellBox};

/// Complete result for one well.
#[derive(Debug, Clone)]
pub struct WellRecord {
    pub row: usize,
    pub col: usize,
    /// Un-annotated resized crop.
    pub sub_image: RgbImage,
    pub raw_gray: f64,
    pub gray_diff: f64,
    pub concentration: f64,
    pub concentration_display: String,
    /// `log10(concentration)`, `0.0` for a zero concentration.
    pub log10_concentration: f64,
    pub well: WellBox,
}

impl WellRecord {
    /// Serializable view without the thumbnail.
    pub fn summary(&self) -> WellSummary {
        WellSummary {
            row: self.row,
            col: self.col,
            raw_gray: self.raw_gray,
            gray_diff: self.gray_diff,
            concentration: self.concentration,
            concentration_display: self.concentration_display.clone(),
            log10_concentration: self.log10_concentration,
            well: self.well,
        }
    }
}

/// Tabular form of a [`WellRecord`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WellSummary {
    pub row: usize,
    pub col: usize,
    pub raw_gray: f64,
    pub gray_diff: f64,
    pub concentration: f64,
    pub concentration_display: String,
    pub log10_concentration: f64,
    pub well: WellBox,
}

/// Per-well quantity laid out as a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    RawGray,
    GrayDiff,
    Concentration,
}

impl MatrixKind {
    /// Stable short name, used for artifact naming.
    pub fn name(self) -> &'static str {
        match self {
            MatrixKind::RawGray => "gray",
            MatrixKind::GrayDiff => "gray_diff",
            MatrixKind::Concentration => "concentration",
        }
    }

    fn value(self, record: &WellRecord) -> f64 {
        match self {
            MatrixKind::RawGray => record.raw_gray,
            MatrixKind::GrayDiff => record.gray_diff,
            MatrixKind::Concentration => record.concentration,
        }
    }
}

/// Parameters describing how a report was produced.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunParameters {
    pub rows: usize,
    pub cols: usize,
    pub radius_fraction: f64,
    pub precision: usize,
    pub calibration: String,
    /// Fitted polynomial, e.g. `P(x) = ... + 0.5`.
    pub expression: String,
}

/// Everything a completed run produces.
#[derive(Debug, Clone)]
pub struct PlateReport {
    pub config: PlateConfig,
    pub curve: CalibrationCurve,
    pub grid: PlateGrid,
    /// Row-major, `rows * cols` entries.
    pub records: Vec<WellRecord>,
    /// Annotated tiles stitched on a white background.
    pub mosaic: RgbImage,
    /// Working copy with grid lines, sampling boxes, and per-well text.
    pub annotated: RgbImage,
}

impl PlateReport {
    /// `rows x cols` matrix of `kind`, row-major.
    pub fn matrix(&self, kind: MatrixKind) -> Vec<Vec<f64>> {
        self.records
            .chunks(self.grid.cols.max(1))
            .map(|row| row.iter().map(|r| kind.value(r)).collect())
            .collect()
    }

    pub fn record(&self, row: usize, col: usize) -> Option<&WellRecord> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.records.get(row * self.grid.cols + col)
    }

    pub fn summaries(&self) -> Vec<WellSummary> {
        self.records.iter().map(WellRecord::summary).collect()
    }

    pub fn run_parameters(&self) -> RunParameters {
        RunParameters {
            rows: self.config.rows,
            cols: self.config.cols,
            radius_fraction: self.config.radius_fraction,
            precision: self.config.precision,
            calibration: self.curve.name().to_string(),
            expression: self.curve.expression(),
        }
    }
}

/// Stitch `tiles` (row-major, one per well) into the mosaic.
///
/// Tile `(i, j)` lands at `(j * sub_w, i * sub_h)`; uncovered area stays white.
pub fn assemble_mosaic<'a>(
    grid: &PlateGrid,
    tiles: impl IntoIterator<Item = &'a RgbImage>,
) -> RgbImage {
    let [w, h] = grid.mosaic_size();
    let [sub_w, sub_h] = grid.sub_size;
    let mut mosaic = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
    for (well, tile) in grid.wells.iter().zip(tiles) {
        imageops::replace(
            &mut mosaic,
            tile,
            (well.col as u32 * sub_w) as i64,
            (well.row as u32 * sub_h) as i64,
        );
    }
    mosaic
}
