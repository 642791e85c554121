//! Cross-well normalization.
//!
//! The palest well of the run is the implicit zero-concentration reference:
//! every well's signal is its distance below the plate-wide maximum gray.

/// Largest raw gray over `values`; `None` when empty.
pub fn max_raw_gray(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

/// Signal of a well relative to the reference maximum.
///
/// Both inputs are the already-rounded raw grays, so the difference inherits
/// their rounding.
#[inline]
pub fn gray_diff(max_raw_gray: f64, raw_gray: f64) -> f64 {
    max_raw_gray - raw_gray
}
