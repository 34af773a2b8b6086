//! Numeric helpers for the derived progress fields
//!
//! All progress comparisons use an epsilon so that re-applying an identical
//! value is a no-op instead of a spurious change.

/// Tolerance below which two progress values are considered equal
pub const EPSILON: f64 = 0.0001;

/// Compare two progress values within [`EPSILON`]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Round to 3 decimal places, the precision stored for earned hours
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Clamp a percent-complete value to the valid [0, 100] range
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
