//! Pass 2: per-well estimation and tile annotation.

use image::RgbImage;
use rayon::prelude::*;

use super::NormalizedPlate;
use crate::annotate::{annotate_tile, AnnotationStyle};
use crate::estimate::{label_lines, ConcentrationEstimator};
use crate::grid::PlateGrid;
use crate::report::WellRecord;

/// One well after pass 2.
#[derive(Debug, Clone)]
pub struct EstimatedWell {
    pub record: WellRecord,
    /// Lines drawn on the tile and the overlay.
    pub lines: [String; 3],
    /// Annotated copy of the sub-image.
    pub tile: RgbImage,
}

#[derive(Debug, Clone)]
pub struct EstimatedPlate {
    pub grid: PlateGrid,
    pub max_raw_gray: f64,
    pub wells: Vec<EstimatedWell>,
}

pub(super) fn run(
    plate: NormalizedPlate,
    estimator: &ConcentrationEstimator<'_>,
    precision: usize,
    style: &AnnotationStyle,
) -> EstimatedPlate {
    let NormalizedPlate {
        grid,
        samples,
        max_raw_gray,
        gray_diffs,
    } = plate;

    let wells: Vec<EstimatedWell> = samples
        .into_par_iter()
        .zip(gray_diffs.into_par_iter())
        .map(|(sample, diff)| {
            let c = estimator.estimate(diff);
            let lines = label_lines(sample.raw_gray, diff, &c.display, precision);
            let mut tile = sample.sub_image.clone();
            annotate_tile(&mut tile, &lines, style);
            let record = WellRecord {
                row: sample.well.row,
                col: sample.well.col,
                sub_image: sample.sub_image,
                raw_gray: sample.raw_gray,
                gray_diff: diff,
                concentration: c.value,
                concentration_display: c.display,
                log10_concentration: c.log10,
                well: sample.well,
            };
            EstimatedWell {
                record,
                lines,
                tile,
            }
        })
        .collect();

    let n_positive = wells.iter().filter(|w| w.record.concentration > 0.0).count();
    tracing::debug!(
        "pass 2: estimated {} wells, {} with non-zero concentration",
        wells.len(),
        n_positive
    );

    EstimatedPlate {
        grid,
        max_raw_gray,
        wells,
    }
}
