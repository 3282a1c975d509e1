//! Display formatting for factor values.
//!
//! The aggregator never rounds; these helpers apply the display precision the
//! browsing surfaces use.

use crate::factor::EmissionFactor;

/// Number of decimal places shown for factor values.
const DISPLAY_DECIMALS: usize = 4;

/// Formats a value to at most [`DISPLAY_DECIMALS`] decimal places, trimming
/// trailing zeros.
///
/// Non-finite values are passed through unchanged (`NaN`, `inf`).
#[must_use]
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.DISPLAY_DECIMALS$}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    // "-0" after trimming means the value rounded to zero.
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// One-line summary of a factor for list display.
#[must_use]
pub fn format_factor(factor: &EmissionFactor) -> String {
    format!(
        "{}: {} {}",
        factor.name,
        format_value(factor.value),
        factor.unit
    )
}
