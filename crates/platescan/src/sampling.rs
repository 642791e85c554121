//! Per-well sampling (pass 1).
//!
//! Each well's sample rectangle is cropped from the working image, resized to
//! the plate-wide sub-image size, reduced to 8-bit luminance, and averaged.
//! Wells are independent, so the pass runs data-parallel; the output keeps
//! the grid's row-major order.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use rayon::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::grid::{PlateGrid, WellBox};
use crate::numfmt::round_significant;

/// Fixed-point BT.601 luma weights (14 fractional bits).
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Pass-1 output for one well.
#[derive(Debug, Clone)]
pub struct WellSample {
    pub well: WellBox,
    /// Resized crop, before any annotation.
    pub sub_image: RgbImage,
    /// Mean luminance rounded to the configured significant digits.
    pub raw_gray: f64,
}

/// 8-bit BT.601 luminance of an RGB pixel.
#[inline]
pub fn luminance(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb;
    let acc = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
    ((acc + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Single-channel luminance image.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    GrayImage::from_fn(w, h, |x, y| Luma([luminance(image.get_pixel(x, y).0)]))
}

/// Unweighted mean over all pixels; `0.0` for an empty image.
pub fn mean_gray(gray: &GrayImage) -> f64 {
    let n = gray.width() as u64 * gray.height() as u64;
    if n == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    sum as f64 / n as f64
}

/// Sample a single well.
pub fn sample_well(
    image: &RgbImage,
    well: &WellBox,
    sub_size: [u32; 2],
    precision: usize,
) -> Result<WellSample> {
    let rect = well.sample_rect;
    if rect.is_empty() || sub_size[0] == 0 || sub_size[1] == 0 {
        return Err(AnalysisError::SampleExtraction {
            row: well.row,
            col: well.col,
            width: rect.width(),
            height: rect.height(),
        });
    }

    let crop = imageops::crop_imm(image, rect.left, rect.top, rect.width(), rect.height()).to_image();
    let sub_image = if crop.dimensions() == (sub_size[0], sub_size[1]) {
        crop
    } else {
        imageops::resize(&crop, sub_size[0], sub_size[1], FilterType::Triangle)
    };

    let raw_gray = round_significant(mean_gray(&to_gray(&sub_image)), precision);

    Ok(WellSample {
        well: *well,
        sub_image,
        raw_gray,
    })
}

/// Sample every well of `grid` (pass 1).
///
/// Fails on the first degenerate well; the whole run is aborted since the
/// one-value-per-well invariant cannot be relaxed.
pub fn sample_wells(image: &RgbImage, grid: &PlateGrid, precision: usize) -> Result<Vec<WellSample>> {
    grid.wells
        .par_iter()
        .map(|well| sample_well(image, well, grid.sub_size, precision))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlateConfig;
    use crate::test_utils::{paint_rect, solid_plate};
    use image::Rgb;

    #[test]
    fn luminance_matches_bt601_reference_values() {
        assert_eq!(luminance([0, 0, 0]), 0);
        assert_eq!(luminance([255, 255, 255]), 255);
        assert_eq!(luminance([255, 0, 0]), 76);
        assert_eq!(luminance([0, 255, 0]), 150);
        assert_eq!(luminance([0, 0, 255]), 29);
        assert_eq!(luminance([200, 200, 200]), 200);
    }

    #[test]
    fn mean_gray_of_two_tone_image() {
        let img = GrayImage::from_fn(4, 2, |x, _| Luma([if x < 2 { 100 } else { 201 }]));
        assert!((mean_gray(&img) - 150.5).abs() < 1e-12);
        assert_eq!(mean_gray(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn uniform_well_samples_its_gray_level() {
        let img = solid_plate(600, 400, [200, 200, 200]);
        let grid = PlateGrid::partition(600, 400, &PlateConfig::default()).unwrap();
        let s = sample_well(&img, &grid.wells[0], grid.sub_size, 4).unwrap();
        assert_eq!(s.raw_gray, 200.0);
        assert_eq!(s.sub_image.dimensions(), (40, 40));
        assert_eq!(s.sub_image.get_pixel(0, 0), &Rgb([200, 200, 200]));
    }

    #[test]
    fn raw_gray_is_rounded_to_significant_digits() {
        let img = solid_plate(600, 400, [187, 187, 187]);
        let grid = PlateGrid::partition(600, 400, &PlateConfig::default()).unwrap();
        let s = sample_well(&img, &grid.wells[0], grid.sub_size, 2).unwrap();
        assert_eq!(s.raw_gray, 190.0);
    }

    #[test]
    fn mean_uses_all_pixels_of_the_resized_crop() {
        let mut img = solid_plate(600, 400, [100, 100, 100]);
        // Right half of well (0, 0)'s 40x40 sample rect is brighter.
        paint_rect(&mut img, 50, 30, 20, 40, [200, 200, 200]);
        let grid = PlateGrid::partition(600, 400, &PlateConfig::default()).unwrap();
        let s = sample_well(&img, &grid.wells[0], grid.sub_size, 6).unwrap();
        assert!((s.raw_gray - 150.0).abs() < 1e-9);
    }

    #[test]
    fn edge_wells_are_resized_to_uniform_size() {
        let img = solid_plate(100, 100, [90, 120, 150]);
        let grid = PlateGrid::partition(100, 100, &PlateConfig::new(1, 1, 1.0, 4)).unwrap();
        let s = sample_well(&img, &grid.wells[0], grid.sub_size, 4).unwrap();
        assert_eq!(s.sub_image.dimensions(), (200, 200));
        assert_eq!(s.raw_gray, luminance([90, 120, 150]) as f64);
    }

    #[test]
    fn degenerate_rect_aborts_sampling() {
        let img = solid_plate(600, 8, [50, 50, 50]);
        let grid = PlateGrid::partition(600, 8, &PlateConfig::new(4, 6, 0.3, 3)).unwrap();
        assert_eq!(grid.wells[0].radius_px, 0);
        let err = sample_wells(&img, &grid, 3).unwrap_err();
        assert!(matches!(err, AnalysisError::SampleExtraction { .. }));
    }

    #[test]
    fn sample_wells_preserves_row_major_order() {
        let mut img = solid_plate(600, 400, [200, 200, 200]);
        paint_rect(&mut img, 420, 220, 60, 60, [0, 0, 0]);
        let grid = PlateGrid::partition(600, 400, &PlateConfig::default()).unwrap();
        let samples = sample_wells(&img, &grid, 4).unwrap();
        assert_eq!(samples.len(), 24);
        for (idx, s) in samples.iter().enumerate() {
            assert_eq!(s.well.row * 6 + s.well.col, idx);
        }
        assert_eq!(samples[2 * 6 + 4].raw_gray, 0.0);
        assert_eq!(samples[0].raw_gray, 200.0);
    }
}
