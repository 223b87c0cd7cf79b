//! Dashboard Configuration

use crate::{AlertingError, DEFAULT_WIDTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Alerting view configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Prometheus UI the per-alert links point to
    pub prometheus_url: Url,
    /// Range shown when none is selected (milliseconds, default: 1 hour)
    pub default_range_ms: i64,
    /// Graph width before the first container measurement (pixels)
    pub default_width: u32,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            prometheus_url: Url::parse("http://localhost:9090/").expect("static URL is valid"),
            default_range_ms: 60 * 60 * 1000,
            default_width: DEFAULT_WIDTH,
        }
    }
}

impl AlertingConfig {
    /// The default range ending at `now_ms`
    pub fn default_range(&self, now_ms: i64) -> Result<TimeRange, AlertingError> {
        TimeRange::new(now_ms - self.default_range_ms, now_ms)
    }
}

/// Visible time range; both ends are representable as timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    from_ms: i64,
    to_ms: i64,
}

impl TimeRange {
    pub fn new(from_ms: i64, to_ms: i64) -> Result<Self, AlertingError> {
        if to_ms <= from_ms {
            return Err(AlertingError::InvalidRange { from_ms, to_ms });
        }
        Ok(Self {
            from: instant(from_ms)?,
            to: instant(to_ms)?,
        })
    }

    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.to
    }
}

fn instant(ms: i64) -> Result<DateTime<Utc>, AlertingError> {
    DateTime::from_timestamp_millis(ms).ok_or(AlertingError::OutOfRange(ms))
}

impl TryFrom<RawRange> for TimeRange {
    type Error = AlertingError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.from_ms, raw.to_ms)
    }
}

impl From<TimeRange> for RawRange {
    fn from(range: TimeRange) -> Self {
        Self {
            from_ms: range.from_ms(),
            to_ms: range.to_ms(),
        }
    }
}
