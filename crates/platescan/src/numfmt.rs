//! Significant-digit rounding and `%g`-style formatting.
//!
//! Gray values are stored rounded to a number of *significant* digits, not
//! decimal places, and every on-image label uses the same general format.

/// Round `value` to `digits` significant decimal digits.
///
/// `round_significant(123.456, 3) == 123.0`, `round_significant(1.23456, 3) == 1.23`.
/// A `digits` of zero is treated as one.
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = digits.max(1);
    // Scientific formatting performs correctly rounded decimal conversion.
    let text = format!("{:.*e}", digits - 1, value);
    text.parse().unwrap_or(value)
}

/// Format `value` like C's `%.{digits}g`.
///
/// Uses fixed notation when the decimal exponent lies in `[-4, digits)`,
/// scientific notation (`1.5e+06`) otherwise; trailing zeros are removed.
pub fn format_general(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_trailing_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        strip_trailing_zeros(&fixed).to_string()
    }
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
