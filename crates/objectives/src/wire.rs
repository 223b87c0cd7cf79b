//! Protobuf JSON Field Encodings
//!
//! The objective service speaks canonical protobuf JSON: durations are
//! strings like `"300s"`, doubles may be `"NaN"` or `"Infinity"`. These
//! modules plug into `#[serde(with = ...)]`.

use crate::ModelError;
use std::time::Duration;

/// Parse a protobuf JSON duration (`"3600s"`, `"1.5s"`)
pub fn parse_duration(input: &str) -> Result<Duration, ModelError> {
    let invalid = || ModelError::InvalidDuration(input.to_string());

    let body = input.trim().strip_suffix('s').ok_or_else(invalid)?;
    let (secs, frac) = match body.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (body, ""),
    };

    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let secs: u64 = secs.parse().map_err(|_| invalid())?;
    let nanos = if frac.is_empty() {
        0
    } else {
        // Right-pad to nanosecond precision: "5" -> 500_000_000
        format!("{:0<9}", frac).parse::<u32>().map_err(|_| invalid())?
    };

    Ok(Duration::new(secs, nanos))
}

/// Format a duration the way protobuf JSON expects it
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else {
        let frac = format!("{:09}", nanos);
        format!("{}.{}s", duration.as_secs(), frac.trim_end_matches('0'))
    }
}

/// `Duration` <-> `"300s"`
pub mod duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    /// Optional duration; missing fields decode as `None`
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_str(&super::super::format_duration(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_duration(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// `f64` <-> JSON number, or `"NaN"` / `"Infinity"` / `"-Infinity"`
pub mod double {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireDouble {
        Number(f64),
        Text(String),
    }

    impl WireDouble {
        fn into_f64(self) -> Result<f64, String> {
            match self {
                WireDouble::Number(n) => Ok(n),
                WireDouble::Text(s) => match s.as_str() {
                    "NaN" => Ok(f64::NAN),
                    "Infinity" => Ok(f64::INFINITY),
                    "-Infinity" => Ok(f64::NEG_INFINITY),
                    other => other
                        .parse::<f64>()
                        .map_err(|_| format!("invalid double: {}", other)),
                },
            }
        }
    }

    /// Serialize adapter for a single double
    struct Double(f64);

    impl Serialize for Double {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.0.is_nan() {
                serializer.serialize_str("NaN")
            } else if self.0.is_infinite() {
                serializer.serialize_str(if self.0 > 0.0 { "Infinity" } else { "-Infinity" })
            } else {
                serializer.serialize_f64(self.0)
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Double(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        WireDouble::deserialize(deserializer)?
            .into_f64()
            .map_err(D::Error::custom)
    }

    pub mod option {
        use super::{Double, WireDouble};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(Double).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<WireDouble>::deserialize(deserializer)?
                .map(|w| w.into_f64().map_err(D::Error::custom))
                .transpose()
        }
    }

    pub mod vec {
        use super::{Double, WireDouble};
        use serde::de::Error as _;
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for v in values {
                seq.serialize_element(&Double(*v))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f64>, D::Error> {
            Vec::<WireDouble>::deserialize(deserializer)?
                .into_iter()
                .map(|w| w.into_f64().map_err(D::Error::custom))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("300s").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0.000000001s").unwrap(), Duration::from_nanos(1));
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_bad_input() {
        for bad in ["300", "-5s", "s", "1.s5", "1.0000000001s", "5m", ""] {
            assert!(parse_duration(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(3600)), "3600s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_nanos(1)), "0.000000001s");
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug)]
    struct Sample {
        #[serde(with = "double::vec")]
        values: Vec<f64>,
    }

    #[test]
    fn test_doubles_accept_special_strings() {
        let sample: Sample =
            serde_json::from_str(r#"{"values":[1, 0.5, "NaN", "Infinity", "-Infinity", "2.5"]}"#)
                .unwrap();
        assert_eq!(sample.values[0], 1.0);
        assert_eq!(sample.values[1], 0.5);
        assert!(sample.values[2].is_nan());
        assert_eq!(sample.values[3], f64::INFINITY);
        assert_eq!(sample.values[4], f64::NEG_INFINITY);
        assert_eq!(sample.values[5], 2.5);

        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(
            json,
            r#"{"values":[1.0,0.5,"NaN","Infinity","-Infinity",2.5]}"#
        );
    }

    #[test]
    fn test_doubles_reject_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"values":["lots"]}"#).is_err());
    }
}
