//! Service Level Objective Model
//!
//! Objectives, multi-window burn-rate alerts and burn-rate timeseries as
//! reported by the objective service, plus the request/response messages
//! used to query it. The protobuf JSON encoding is handled at this boundary:
//! downstream code never sees wire sentinels or duration strings.

mod error;
mod labels;
mod model;
mod rpc;
pub mod wire;

pub use error::ModelError;
pub use labels::{display_label, Labels};
pub use model::{Alert, AlertState, Current, Objective, Series, Timeseries, WindowSample};
pub use rpc::{
    GetAlertsRequest, GetAlertsResponse, GraphBurnratesRequest, GraphBurnratesResponse,
    ListRequest, ListResponse,
};

/// Wire value the objective service reports when a window has no data
pub const NO_DATA_SENTINEL: f64 = -1.0;
