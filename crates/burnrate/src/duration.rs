//! Compact Duration Formatting

/// Units from largest to smallest, sized in milliseconds
const UNITS: [(&str, u64); 7] = [
    ("y", 365 * 24 * 60 * 60 * 1000),
    ("w", 7 * 24 * 60 * 60 * 1000),
    ("d", 24 * 60 * 60 * 1000),
    ("h", 60 * 60 * 1000),
    ("m", 60 * 1000),
    ("s", 1000),
    ("ms", 1),
];

/// Format milliseconds as e.g. `4w`, `1h`, `4m17s142ms`.
///
/// Infinity renders as `∞`; NaN, negative and zero durations as `0s`.
pub fn format_duration(ms: f64) -> String {
    format_with_precision(ms, UNITS.len())
}

/// Like [`format_duration`] but keeps at most `precision` units,
/// counted from the largest non-zero one.
pub fn format_with_precision(ms: f64, precision: usize) -> String {
    if ms == f64::INFINITY {
        return "∞".to_string();
    }
    if ms.is_nan() || ms < 1.0 {
        return "0s".to_string();
    }

    let mut remaining = ms.floor() as u64;
    let mut result = String::new();
    let mut used = 0;

    for (unit, size) in UNITS {
        if used >= precision {
            break;
        }
        let count = remaining / size;
        if count > 0 {
            result.push_str(&format!("{}{}", count, unit));
            remaining %= size;
            used += 1;
        } else if used > 0 {
            // A skipped unit still counts once the leading unit is set
            used += 1;
        }
    }

    result
}
