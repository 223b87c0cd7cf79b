//! Current Burn-Rate Formatting

use objectives::Current;

/// Display string for a window's current burn rate.
///
/// Missing data renders as `NaN`; a value the service has not computed yet
/// renders as zero.
pub fn format_current(current: &Current) -> String {
    match current {
        Current::NoData => "NaN".to_string(),
        Current::NotComputed => to_fixed(0.0, 3),
        Current::Value(v) => to_fixed(*v, 3),
    }
}

/// Fixed-point text with `digits` decimals, as a browser's `toFixed` prints it.
///
/// Exact ties round away from zero and negative zero prints unsigned.
/// Magnitudes of 1e21 and above use exponent notation. At most 20 digits.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let digits = digits.min(20);
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value.abs() >= 1e21 {
        return format!("{:e}", value).replace("e", "e+");
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    // A tie at `digits` decimals is an odd multiple of 2^-(digits + 1)
    let halves = magnitude * 2f64.powi(digits as i32 + 1);
    if halves.fract() == 0.0 && halves % 2.0 == 1.0 {
        let scaled = (halves as u128 * 5u128.pow(digits as u32) + 1) / 2;
        let unit = 10u128.pow(digits as u32);
        let text = if digits == 0 {
            format!("{}", scaled)
        } else {
            format!("{}.{:0width$}", scaled / unit, scaled % unit, width = digits)
        };
        return format!("{}{}", sign, text);
    }

    format!("{}{:.*}", sign, digits, magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_way_branch() {
        assert_eq!(format_current(&Current::NoData), "NaN");
        assert_eq!(format_current(&Current::NotComputed), "0.000");
        assert_eq!(format_current(&Current::Value(0.14)), "0.140");
        assert_eq!(format_current(&Current::Value(12.3456)), "12.346");
    }

    #[test]
    fn test_sentinel_from_wire() {
        assert_eq!(format_current(&Current::from_wire(Some(-1.0))), "NaN");
        assert_eq!(format_current(&Current::from_wire(None)), "0.000");
        assert_eq!(format_current(&Current::from_wire(Some(-0.5))), "-0.500");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.0625, 3), "0.063");
        assert_eq!(to_fixed(0.1875, 3), "0.188");
        assert_eq!(to_fixed(-0.0625, 3), "-0.063");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(format_current(&Current::Value(0.0625)), "0.063");
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        assert_eq!(to_fixed(-0.0, 3), "0.000");
        assert_eq!(format_current(&Current::Value(-0.0)), "0.000");
        assert_eq!(to_fixed(-0.0001, 3), "-0.000");
    }

    #[test]
    fn test_non_ties_and_special_values() {
        assert_eq!(to_fixed(0.14, 3), "0.140");
        assert_eq!(to_fixed(12.3456, 3), "12.346");
        assert_eq!(to_fixed(1.0005, 3), "1.000");
        assert_eq!(to_fixed(f64::NAN, 3), "NaN");
        assert_eq!(to_fixed(f64::INFINITY, 3), "Infinity");
        assert_eq!(to_fixed(-f64::INFINITY, 3), "-Infinity");
        assert_eq!(to_fixed(1e21, 3), "1e+21");
    }

    proptest! {
        #[test]
        fn prop_values_have_three_decimals(v in -1000.0f64..1000.0) {
            prop_assume!(v != -1.0);
            let text = format_current(&Current::from_wire(Some(v)));
            let (_, decimals) = text.split_once('.').unwrap();
            prop_assert_eq!(decimals.len(), 3);
        }
    }
}
