//! Objective, Alert and Timeseries Types

use crate::wire;
use crate::{Labels, ModelError, NO_DATA_SENTINEL};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// A service level objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Labels identifying the objective
    #[serde(default)]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Target ratio in (0, 1), e.g. 0.99
    #[serde(default, with = "wire::double")]
    pub target: f64,
    /// Total objective window
    #[serde(default, with = "wire::duration")]
    pub window: Duration,
}

impl Objective {
    pub fn new(labels: Labels, target: f64, window: Duration) -> Self {
        Self {
            labels,
            description: String::new(),
            target,
            window,
        }
    }

    /// Allowed failure ratio over the window
    pub fn error_budget(&self) -> f64 {
        1.0 - self.target
    }
}

/// Evaluation state of a burn-rate alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlertState {
    #[default]
    Inactive,
    Pending,
    Firing,
}

impl AlertState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Inactive => "inactive",
            AlertState::Pending => "pending",
            AlertState::Firing => "firing",
        }
    }

    pub fn is_firing(&self) -> bool {
        matches!(self, AlertState::Firing)
    }

    /// Protobuf enum number
    pub fn number(&self) -> u8 {
        match self {
            AlertState::Inactive => 0,
            AlertState::Pending => 1,
            AlertState::Firing => 2,
        }
    }

    pub fn from_number(n: u64) -> Result<Self, ModelError> {
        match n {
            0 => Ok(AlertState::Inactive),
            1 => Ok(AlertState::Pending),
            2 => Ok(AlertState::Firing),
            other => Err(ModelError::UnknownState(other.to_string())),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        match name {
            "inactive" => Ok(AlertState::Inactive),
            "pending" => Ok(AlertState::Pending),
            "firing" => Ok(AlertState::Firing),
            other => Err(ModelError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlertState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlertState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireState {
            Number(u64),
            Name(String),
        }

        let parsed = match WireState::deserialize(deserializer)? {
            WireState::Number(n) => AlertState::from_number(n),
            WireState::Name(name) => AlertState::from_name(&name),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Current burn rate of one alert window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Current {
    /// The service has not reported a value (field absent)
    #[default]
    NotComputed,
    /// The window has no data to compute a burn rate from
    NoData,
    Value(f64),
}

impl Current {
    /// Decode the wire representation, where `-1` marks missing data
    pub fn from_wire(raw: Option<f64>) -> Self {
        match raw {
            None => Current::NotComputed,
            Some(v) if v == NO_DATA_SENTINEL => Current::NoData,
            Some(v) => Current::Value(v),
        }
    }

    pub fn to_wire(self) -> Option<f64> {
        match self {
            Current::NotComputed => None,
            Current::NoData => Some(NO_DATA_SENTINEL),
            Current::Value(v) => Some(v),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Current::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// One evaluation window of a multi-window alert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireWindowSample", into = "WireWindowSample")]
pub struct WindowSample {
    pub window: Duration,
    pub current: Current,
    /// Raw query used to compute the burn rate
    pub query: String,
}

impl WindowSample {
    pub fn new(window: Duration, current: Current, query: impl Into<String>) -> Self {
        Self {
            window,
            current,
            query: query.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireWindowSample {
    #[serde(default, with = "wire::duration::option", skip_serializing_if = "Option::is_none")]
    window: Option<Duration>,
    #[serde(default, with = "wire::double::option", skip_serializing_if = "Option::is_none")]
    current: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    query: String,
}

impl From<WireWindowSample> for WindowSample {
    fn from(wire: WireWindowSample) -> Self {
        Self {
            window: wire.window.unwrap_or_default(),
            current: Current::from_wire(wire.current),
            query: wire.query,
        }
    }
}

impl From<WindowSample> for WireWindowSample {
    fn from(sample: WindowSample) -> Self {
        Self {
            window: Some(sample.window),
            current: sample.current.to_wire(),
            query: sample.query,
        }
    }
}

/// A multi-window burn-rate alert derived from an objective
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Objective labels plus the grouping values of this alert
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub state: AlertState,
    #[serde(default)]
    pub severity: String,
    /// How long both windows must exceed the threshold before firing
    #[serde(default, rename = "for", with = "wire::duration")]
    pub for_duration: Duration,
    /// Burn-rate multiplier defining the threshold
    #[serde(default, with = "wire::double")]
    pub factor: f64,
    #[serde(default)]
    pub short: WindowSample,
    #[serde(default)]
    pub long: WindowSample,
}

/// One sample series; values are `NaN` where the service marks data missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, with = "wire::double::vec")]
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Timeseries response item.
///
/// `series[0]` holds the timestamps (seconds); each further series holds the
/// values described by the label at the same position minus one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(default)]
    pub series: Vec<Series>,
}

impl Timeseries {
    pub fn timestamps(&self) -> Option<&[f64]> {
        self.series.first().map(|s| s.values.as_slice())
    }

    pub fn value_series(&self) -> &[Series] {
        self.series.get(1..).unwrap_or(&[])
    }
}
