//! Objective Service Messages

use crate::wire;
use crate::{Alert, Objective, Timeseries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// List objectives matching a selector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    pub expr: String,
    #[serde(default)]
    pub grouping: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

/// Alerts of one objective, split by grouping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAlertsRequest {
    /// Objective selector
    pub expr: String,
    /// Grouping selector
    #[serde(default)]
    pub grouping: String,
    /// Include alerts that are not pending or firing
    #[serde(default)]
    pub inactive: bool,
    /// Include current burn-rate values
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAlertsResponse {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Burn-rate timeseries for one short/long window pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphBurnratesRequest {
    pub expr: String,
    #[serde(default)]
    pub grouping: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(with = "wire::duration")]
    pub short: Duration,
    #[serde(with = "wire::duration")]
    pub long: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphBurnratesResponse {
    #[serde(default)]
    pub timeseries: Vec<Timeseries>,
}
