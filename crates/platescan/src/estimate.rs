//! Concentration estimation and its compact display form.

use crate::calibration::CalibrationCurve;
use crate::numfmt::format_general;

/// Estimated concentration of one well.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Concentration {
    /// `0.0` iff the well's gray difference is zero.
    pub value: f64,
    /// `log10(value)`, or `0.0` for a zero concentration.
    pub log10: f64,
    /// Scientific-notation label, e.g. `"2.35*10^3"`.
    pub display: String,
}

/// Evaluates a fitted curve and formats the result.
///
/// Borrows the curve chosen for the run; no name lookup happens per well.
#[derive(Debug, Clone, Copy)]
pub struct ConcentrationEstimator<'a> {
    curve: &'a CalibrationCurve,
    precision: usize,
}

impl<'a> ConcentrationEstimator<'a> {
    pub fn new(curve: &'a CalibrationCurve, precision: usize) -> Self {
        Self { curve, precision }
    }

    pub fn curve(&self) -> &CalibrationCurve {
        self.curve
    }

    pub fn estimate(&self, gray_diff: f64) -> Concentration {
        let value = self.curve.evaluate(gray_diff);
        Concentration {
            value,
            log10: if value > 0.0 { value.log10() } else { 0.0 },
            display: format_concentration(value, self.precision),
        }
    }
}

/// `mantissa*10^exponent` with `precision - 1` significant mantissa digits.
///
/// The `*10^0` suffix is omitted and a zero concentration renders as `"0"`.
pub fn format_concentration(value: f64, precision: usize) -> String {
    if !(value > 0.0) {
        return "0".to_string();
    }
    let exponent = value.log10().floor() as i32;
    let mantissa = value / 10f64.powi(exponent);
    let mantissa = format_general(mantissa, precision.saturating_sub(1));
    if exponent == 0 {
        mantissa
    } else {
        format!("{mantissa}*10^{exponent}")
    }
}

/// The three annotation lines drawn for a well.
pub fn label_lines(raw_gray: f64, gray_diff: f64, display: &str, precision: usize) -> [String; 3] {
    [
        format!("Avg: {}", format_general(raw_gray, precision)),
        format!("Diff: {}", format_general(gray_diff, precision)),
        format!("Density: {display}"),
    ]
}
