//! Objective Service Contract

use crate::ServiceError;
use objectives::{
    GetAlertsRequest, GetAlertsResponse, GraphBurnratesRequest, GraphBurnratesResponse,
    ListRequest, ListResponse,
};
use std::future::Future;

/// Remote objective service.
///
/// Futures are `Send` so controllers can be driven from a multi-threaded
/// server as well as from the single-threaded dashboard loop.
pub trait ObjectiveService {
    /// Objectives matching a selector
    fn list_objectives(
        &self,
        request: ListRequest,
    ) -> impl Future<Output = Result<ListResponse, ServiceError>> + Send;

    /// Alerts of an objective, per grouping
    fn get_alerts(
        &self,
        request: GetAlertsRequest,
    ) -> impl Future<Output = Result<GetAlertsResponse, ServiceError>> + Send;

    /// Burn-rate timeseries of one short/long window pair
    fn graph_burnrates(
        &self,
        request: GraphBurnratesRequest,
    ) -> impl Future<Output = Result<GraphBurnratesResponse, ServiceError>> + Send;
}
