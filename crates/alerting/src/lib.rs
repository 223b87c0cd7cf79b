//! Alerting Dashboard Controllers
//!
//! Turns an objective's multi-window burn-rate alerts into table rows, and
//! keeps one burn-rate graph per firing alert up to date with the selected
//! time range. Remote calls go through [`objective_service::ObjectiveService`].

mod config;
mod dashboard;
mod error;
mod graph;
mod key;
mod link;
mod list;
mod plot;
mod resize;
mod row;

pub use config::{AlertingConfig, TimeRange};
pub use dashboard::{Dashboard, Outcome};
pub use error::AlertingError;
pub use graph::{BurnrateGraphController, GraphDeps, GraphFetch, GraphStatus};
pub use key::AlertKey;
pub use link::PrometheusLink;
pub use list::{
    AlertListController, AlertTableRow, AlertsFetch, BurnratesFetch, GraphRow, Refetch,
};
pub use plot::{PlotFrame, PlotOptions, PlotRenderer, Scale, SeriesStyle, BURNRATE_PALETTE};
pub use resize::{ResizeBus, ResizeSubscription, DEFAULT_WIDTH};
pub use row::{AlertRow, EXHAUSTION_TOOLTIP};

/// Counter of alert and graph fetch outcomes, labelled by `kind` and `outcome`
pub const FETCH_COUNTER: &str = "slo_dashboard_fetch_total";
