//! platescan: colorimetric quantification of microwell plate photographs.
//!
//! A plate image is split into a `rows x cols` grid, a square region at each
//! well center is sampled to a mean luminance, and the darkening relative to
//! the palest well is mapped through a fitted calibration curve to a
//! concentration. The pipeline stages are:
//!
//! 1. **Grid** – partition the image and size the per-well sample boxes.
//! 2. **Sampling** – crop, resize, and average each well (pass 1).
//! 3. **Normalize** – reference every well against the plate-wide maximum.
//! 4. **Estimate** – evaluate the calibration polynomial per well (pass 2).
//! 5. **Annotate** – adaptive text on mosaic tiles and on the original.
//! 6. **Report** – matrices, mosaic, annotated image, per-well records.
//!
//! # Public API
//! - [`Analyzer`] as the primary entry point
//! - [`AnalysisConfig`] / [`PlateConfig`] for run configuration
//! - [`CalibrationCatalog`] and [`CalibrationCurve`] for calibration
//! - [`PlateReport`] and the [`ReportSink`] export interface

mod annotate;
mod api;
mod calibration;
mod config;
mod error;
mod estimate;
mod export;
mod grid;
mod normalize;
mod numfmt;
mod pipeline;
mod report;
mod sampling;

#[cfg(test)]
pub(crate) mod test_utils;

pub use annotate::{
    annotate_overlay, annotate_tile, draw_box_outline, draw_grid_lines, draw_layout, draw_text,
    layout_text, measure_text, AnnotationStyle, LayoutMode, PlacedLine, TextLayout, TextSize,
};
pub use api::{analyze_plate, Analyzer};
pub use calibration::{
    polyfit, polyval, CalibrationCatalog, CalibrationCurve, CURVE_DEGREE, DEFAULT_CURVE,
};
pub use config::{guess_grid_from_filename, AnalysisConfig, PlateConfig};
pub use error::{AnalysisError, ExportWarning, Result};
pub use estimate::{format_concentration, label_lines, Concentration, ConcentrationEstimator};
pub use export::{
    export_report, try_export, ReportSink, SinkError, ANNOTATED_ARTIFACT, EXPORTED_MATRICES,
    MOSAIC_ARTIFACT,
};
pub use grid::{BoxRect, PlateGrid, SampleRect, WellBox};
pub use numfmt::{format_general, round_significant};
pub use report::{assemble_mosaic, MatrixKind, PlateReport, RunParameters, WellRecord, WellSummary};
pub use sampling::{luminance, sample_well, sample_wells, WellSample};
