//! Least-squares polynomial fitting.

use nalgebra::{DMatrix, DVector};

/// Fit a polynomial of `degree` to `(x, y)` by least squares.
///
/// Returns coefficients highest power first. The Vandermonde columns are
/// scaled to unit norm before the SVD solve and unscaled afterwards, which
/// keeps high-degree fits on pixel-range abscissae well conditioned.
///
/// Returns `None` for mismatched lengths, too few points, non-finite input,
/// or a singular system.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len();
    let m = degree + 1;
    if n != y.len() || n < m {
        return None;
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return None;
    }

    let mut lhs = DMatrix::<f64>::from_fn(n, m, |i, j| x[i].powi((degree - j) as i32));
    let mut scale = vec![0.0; m];
    for (j, s) in scale.iter_mut().enumerate() {
        let norm = lhs.column(j).norm();
        *s = if norm > 0.0 { norm } else { 1.0 };
        lhs.column_mut(j).unscale_mut(*s);
    }
    let rhs = DVector::from_column_slice(y);

    let svd = lhs.svd(true, true);
    let s_max = svd.singular_values.max();
    let s_min = svd.singular_values.min();
    let eps = n as f64 * f64::EPSILON * s_max;
    // Rank-deficient systems would silently drop a degree of freedom.
    if !(s_min > eps) {
        return None;
    }
    let sol = svd.solve(&rhs, eps).ok()?;

    let coeffs: Vec<f64> = sol.iter().zip(&scale).map(|(c, s)| c / s).collect();
    if coeffs.iter().all(|c| c.is_finite()) {
        Some(coeffs)
    } else {
        None
    }
}

/// Evaluate a polynomial (highest power first) at `x` with Horner's scheme.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}
