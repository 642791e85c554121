//! High-level analysis API.
//!
//! [`Analyzer`] is the primary entry point. It owns the run configuration and
//! the calibration curve fitted at construction, so every analysis with the
//! same analyzer uses identical coefficients.

use std::path::Path;

use image::RgbImage;

use crate::calibration::{CalibrationCatalog, CalibrationCurve};
use crate::config::{AnalysisConfig, PlateConfig};
use crate::error::Result;
use crate::pipeline;
use crate::report::PlateReport;

/// Primary analysis interface.
///
/// Create once, analyze many images.
///
/// # Examples
///
/// ```no_run
/// use platescan::{AnalysisConfig, Analyzer};
/// use image::RgbImage;
///
/// let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
/// let image = RgbImage::new(600, 400);
/// let report = analyzer.analyze(&image).unwrap();
/// println!("{} wells", report.records.len());
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    curve: CalibrationCurve,
}

impl Analyzer {
    /// Validate `config` and fit its calibration curve from the built-in catalog.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Self::with_catalog(config, &CalibrationCatalog::builtin())
    }

    /// Like [`Analyzer::new`], selecting the curve from `catalog`.
    pub fn with_catalog(config: AnalysisConfig, catalog: &CalibrationCatalog) -> Result<Self> {
        config.plate.validate()?;
        let curve = catalog.select(&config.calibration)?;
        Ok(Self { config, curve })
    }

    /// Use an already fitted curve.
    pub fn with_curve(plate: PlateConfig, curve: CalibrationCurve) -> Result<Self> {
        plate.validate()?;
        let config = AnalysisConfig {
            plate,
            calibration: curve.name().to_string(),
            ..AnalysisConfig::default()
        };
        Ok(Self { config, curve })
    }

    /// Load an [`AnalysisConfig`] JSON file and build an analyzer from it.
    pub fn from_json_file(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(AnalysisConfig::from_json_file(path)?)?)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn curve(&self) -> &CalibrationCurve {
        &self.curve
    }

    /// Analyze one plate image. `image` is left untouched.
    pub fn analyze(&self, image: &RgbImage) -> Result<PlateReport> {
        pipeline::run(image, &self.config.plate, &self.curve, &self.config.style)
    }
}

/// One-shot analysis with a built-in curve and the default style.
pub fn analyze_plate(image: &RgbImage, plate: PlateConfig, calibration: &str) -> Result<PlateReport> {
    let config = AnalysisConfig {
        plate,
        calibration: calibration.to_string(),
        ..AnalysisConfig::default()
    };
    Analyzer::new(config)?.analyze(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::report::MatrixKind;
    use crate::test_utils::{count_color, count_other, paint_rect, solid_plate};

    fn default_analyzer() -> Analyzer {
        Analyzer::new(AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn solid_plate_has_uniform_zero_signal() {
        let img = solid_plate(600, 400, [200, 200, 200]);
        let report = default_analyzer().analyze(&img).unwrap();

        assert_eq!(report.records.len(), 24);
        for r in &report.records {
            assert_eq!(r.raw_gray, 200.0);
            assert_eq!(r.gray_diff, 0.0);
            assert_eq!(r.concentration, 0.0);
            assert_eq!(r.concentration_display, "0");
            assert_eq!(r.log10_concentration, 0.0);
        }
        let m = report.matrix(MatrixKind::RawGray);
        assert_eq!(m.len(), 4);
        assert!(m.iter().all(|row| row.len() == 6));
    }

    #[test]
    fn dark_patch_is_the_only_positive_well() {
        let mut img = solid_plate(600, 400, [200, 200, 200]);
        let well = (2usize, 3usize);
        // Well (2, 3) samples x 330..370, y 230..270.
        paint_rect(&mut img, 330, 230, 40, 40, [170, 170, 170]);
        let report = default_analyzer().analyze(&img).unwrap();

        for r in &report.records {
            if (r.row, r.col) == well {
                assert_eq!(r.raw_gray, 170.0);
                assert_eq!(r.gray_diff, 30.0);
                assert!(r.concentration > 0.0);
                assert!(r.concentration_display.contains("*10^"));
            } else {
                assert_eq!(r.raw_gray, 200.0);
                assert_eq!(r.gray_diff, 0.0);
                assert_eq!(r.concentration, 0.0);
            }
        }
        let conc = report.matrix(MatrixKind::Concentration);
        assert!(conc[2][3] > 0.0);
        assert_eq!(report.record(2, 3).unwrap().concentration, conc[2][3]);
    }

    #[test]
    fn zero_concentration_iff_zero_diff_for_every_curve() {
        let mut img = solid_plate(600, 400, [210, 205, 200]);
        paint_rect(&mut img, 30, 130, 40, 40, [120, 110, 100]);
        paint_rect(&mut img, 430, 330, 40, 40, [190, 185, 180]);
        for name in CalibrationCatalog::builtin().names() {
            let report = analyze_plate(&img, PlateConfig::default(), name).unwrap();
            for r in &report.records {
                assert!(r.gray_diff >= 0.0);
                assert_eq!(r.concentration == 0.0, r.gray_diff == 0.0, "{name}");
            }
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let mut img = solid_plate(600, 400, [180, 190, 200]);
        paint_rect(&mut img, 130, 30, 40, 40, [60, 90, 120]);
        paint_rect(&mut img, 520, 320, 60, 60, [140, 150, 160]);
        let analyzer = default_analyzer();
        let a = analyzer.analyze(&img).unwrap();
        let b = analyzer.analyze(&img).unwrap();
        for kind in [MatrixKind::RawGray, MatrixKind::GrayDiff, MatrixKind::Concentration] {
            let (ma, mb) = (a.matrix(kind), b.matrix(kind));
            for (ra, rb) in ma.iter().zip(&mb) {
                for (x, y) in ra.iter().zip(rb) {
                    assert_eq!(x.to_bits(), y.to_bits());
                }
            }
        }
        assert_eq!(a.mosaic, b.mosaic);
        assert_eq!(a.annotated, b.annotated);
    }

    #[test]
    fn caller_image_is_not_modified() {
        let img = solid_plate(600, 400, [200, 200, 200]);
        let before = img.clone();
        let report = default_analyzer().analyze(&img).unwrap();
        assert_eq!(img, before);
        assert_ne!(report.annotated, before);
    }

    #[test]
    fn annotated_image_has_grid_and_boxes() {
        let img = solid_plate(600, 400, [200, 200, 200]);
        let report = default_analyzer().analyze(&img).unwrap();
        assert_eq!(report.annotated.get_pixel(50, 100).0, [0, 0, 255]);
        assert_eq!(report.annotated.get_pixel(130, 130).0, [255, 0, 0]);
        // Grid lines are drawn before sampling, yet do not reach sample rects.
        assert_eq!(report.records[0].sub_image.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn mosaic_tiles_carry_text_but_records_keep_clean_crops() {
        let img = solid_plate(600, 400, [200, 200, 200]);
        let report = default_analyzer().analyze(&img).unwrap();
        assert_eq!(report.mosaic.dimensions(), (240, 160));
        assert!(count_other(&report.mosaic, [200, 200, 200]) > 0);
        for r in &report.records {
            assert_eq!(count_color(&r.sub_image, [200, 200, 200]), 40 * 40);
        }
    }

    #[test]
    fn unknown_curve_fails_at_construction() {
        let config = AnalysisConfig {
            calibration: "nope".to_string(),
            ..AnalysisConfig::default()
        };
        let err = Analyzer::new(config).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownCalibration { .. }));
    }

    #[test]
    fn invalid_plate_fails_at_construction() {
        let err = Analyzer::with_curve(
            PlateConfig::new(4, 6, 0.0, 4),
            CalibrationCatalog::builtin().select("miR-935").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn tiny_image_is_a_config_error() {
        let img = solid_plate(5, 5, [10, 10, 10]);
        let err = default_analyzer().analyze(&img).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn run_parameters_describe_the_run() {
        let analyzer = Analyzer::with_curve(
            PlateConfig::new(2, 3, 0.25, 3),
            CalibrationCatalog::builtin().select("miR-2284W").unwrap(),
        )
        .unwrap();
        let report = analyzer.analyze(&solid_plate(300, 200, [90, 90, 90])).unwrap();
        let params = report.run_parameters();
        assert_eq!((params.rows, params.cols, params.precision), (2, 3, 3));
        assert_eq!(params.calibration, "miR-2284W");
        assert_eq!(params.expression, analyzer.curve().expression());
    }
}
