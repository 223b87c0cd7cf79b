//! Alert Threshold and Budget Exhaustion

use std::time::Duration;

/// Burn-rate threshold an alert fires above: `factor * (1 - target)`
pub fn threshold(factor: f64, target: f64) -> f64 {
    factor * (1.0 - target)
}

/// Time in milliseconds until the whole error budget of `window` is spent
/// at `factor` times the uniform burn rate.
///
/// A factor of zero yields positive infinity.
pub fn exhaustion_ms(window: Duration, factor: f64) -> f64 {
    (window.as_secs_f64() * 1000.0) / factor
}

/// Explanation of the threshold, e.g. `14 * (1 - 0.99)`
pub fn threshold_formula(factor: f64, target: f64) -> String {
    format!("{} * (1 - {})", factor, target)
}
