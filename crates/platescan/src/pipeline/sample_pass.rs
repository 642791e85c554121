//! Pass 1 and the normalization barrier.

use image::RgbImage;

use crate::error::Result;
use crate::grid::PlateGrid;
use crate::normalize::{gray_diff, max_raw_gray};
use crate::sampling::{sample_wells, WellSample};

/// Every well sampled; nothing normalized yet.
#[derive(Debug, Clone)]
pub struct SampledPlate {
    pub grid: PlateGrid,
    /// Row-major, one per well.
    pub samples: Vec<WellSample>,
}

/// Pass-1 output with the plate-wide reference applied.
#[derive(Debug, Clone)]
pub struct NormalizedPlate {
    pub grid: PlateGrid,
    pub samples: Vec<WellSample>,
    pub max_raw_gray: f64,
    /// `max_raw_gray - raw_gray` per well, same order as `samples`.
    pub gray_diffs: Vec<f64>,
}

impl SampledPlate {
    pub(super) fn sample(working: &RgbImage, grid: PlateGrid, precision: usize) -> Result<Self> {
        let samples = sample_wells(working, &grid, precision)?;
        tracing::debug!("pass 1: sampled {} wells", samples.len());
        Ok(Self { grid, samples })
    }

    /// Apply the global-maximum reference. Consumes the complete pass-1 set.
    pub fn normalize(self) -> NormalizedPlate {
        let max = max_raw_gray(self.samples.iter().map(|s| s.raw_gray)).unwrap_or(0.0);
        let gray_diffs = self
            .samples
            .iter()
            .map(|s| gray_diff(max, s.raw_gray))
            .collect();
        tracing::debug!("reference gray {}", max);
        NormalizedPlate {
            grid: self.grid,
            samples: self.samples,
            max_raw_gray: max,
            gray_diffs,
        }
    }
}
