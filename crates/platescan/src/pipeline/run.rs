//! Top-level pipeline orchestrator.

use image::{Rgb, RgbImage};

use super::estimate_pass;
use super::SampledPlate;
use crate::annotate::{annotate_overlay, draw_grid_lines, AnnotationStyle};
use crate::calibration::CalibrationCurve;
use crate::config::PlateConfig;
use crate::error::Result;
use crate::estimate::ConcentrationEstimator;
use crate::grid::PlateGrid;
use crate::report::{assemble_mosaic, PlateReport};

/// Run the whole pipeline on `image`. The caller's image is never modified.
pub(crate) fn run(
    image: &RgbImage,
    config: &PlateConfig,
    curve: &CalibrationCurve,
    style: &AnnotationStyle,
) -> Result<PlateReport> {
    let (width, height) = image.dimensions();
    let grid = PlateGrid::partition(width, height, config)?;

    let mut working = image.clone();
    draw_grid_lines(
        &mut working,
        &grid,
        Rgb(style.grid_color),
        style.line_thickness,
    );

    let sampled = SampledPlate::sample(&working, grid, config.precision)?;
    let normalized = sampled.normalize();

    let estimator = ConcentrationEstimator::new(curve, config.precision);
    let estimated = estimate_pass::run(normalized, &estimator, config.precision, style);

    // Overlay drawing mutates the shared working image, so it stays sequential.
    for well in &estimated.wells {
        annotate_overlay(&mut working, &well.record.well, &well.lines, style);
    }

    let mosaic = assemble_mosaic(&estimated.grid, estimated.wells.iter().map(|w| &w.tile));
    let records: Vec<_> = estimated.wells.into_iter().map(|w| w.record).collect();

    tracing::info!(
        "{} wells analyzed with {} (reference gray {})",
        records.len(),
        curve.name(),
        estimated.max_raw_gray
    );

    Ok(PlateReport {
        config: *config,
        curve: curve.clone(),
        grid: estimated.grid,
        records,
        mosaic,
        annotated: working,
    })
}
