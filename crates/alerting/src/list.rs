//! Alert List Controller
//!
//! Fetches the alerts of one objective and grouping, builds a summary row
//! per alert, and keeps a graph controller per alert that shows and fetches
//! burn rates only while the alert is firing.

use crate::{
    AlertKey, AlertRow, BurnrateGraphController, GraphDeps, GraphFetch, GraphStatus, PlotFrame,
    PrometheusLink, ResizeBus, TimeRange, FETCH_COUNTER,
};
use burnrate::threshold;
use metrics::counter;
use objective_service::{ObjectiveService, ServiceError};
use objectives::{
    Alert, GetAlertsRequest, GetAlertsResponse, GraphBurnratesResponse, Labels, Objective,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// An alert list request, tagged with the generation it answers
#[derive(Debug, Clone, PartialEq)]
pub struct AlertsFetch {
    pub generation: u64,
    pub request: GetAlertsRequest,
}

/// A graph fetch for the row identified by `key`
#[derive(Debug, Clone, PartialEq)]
pub struct BurnratesFetch {
    pub key: AlertKey,
    pub fetch: GraphFetch,
}

/// Requests made necessary by a new objective or grouping
#[derive(Debug, Clone, PartialEq)]
pub struct Refetch {
    pub alerts: AlertsFetch,
    /// Visible graphs, refetched for the new selector right away
    pub graphs: Vec<BurnratesFetch>,
}

/// Expandable graph row below an alert's summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRow {
    /// Shown only for firing alerts
    pub visible: bool,
    pub status: GraphStatus,
    pub frame: Option<PlotFrame>,
}

/// Summary and graph row of one alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertTableRow {
    pub key: String,
    pub summary: AlertRow,
    pub graph: GraphRow,
}

pub struct AlertListController {
    objective: Objective,
    grouping: Labels,
    range: TimeRange,
    link: PrometheusLink,
    bus: ResizeBus,
    alerts: Vec<Alert>,
    keys: Vec<AlertKey>,
    graphs: HashMap<AlertKey, BurnrateGraphController>,
    generation: u64,
}

impl AlertListController {
    pub fn new(
        objective: Objective,
        grouping: Labels,
        range: TimeRange,
        link: PrometheusLink,
        bus: ResizeBus,
    ) -> Self {
        info!("Alert list for objective {}", objective.labels);
        Self {
            objective,
            grouping,
            range,
            link,
            bus,
            alerts: Vec::new(),
            keys: Vec::new(),
            graphs: HashMap::new(),
            generation: 0,
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn grouping(&self) -> &Labels {
        &self.grouping
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn graph(&self, key: &AlertKey) -> Option<&BurnrateGraphController> {
        self.graphs.get(key)
    }

    /// Keys of the current alerts, in list order
    pub fn keys(&self) -> &[AlertKey] {
        &self.keys
    }

    /// Request the alert list for the current objective and grouping.
    ///
    /// Any response to an earlier request is ignored from now on.
    pub fn request_alerts(&mut self) -> AlertsFetch {
        self.generation += 1;
        let request = GetAlertsRequest {
            expr: self.objective.labels.selector(),
            grouping: self.grouping.selector(),
            inactive: true,
            current: true,
        };
        debug!(
            "Fetching alerts {} by {}, generation {}",
            request.expr, request.grouping, self.generation
        );
        AlertsFetch {
            generation: self.generation,
            request,
        }
    }

    pub fn set_objective(&mut self, objective: Objective) -> Option<Refetch> {
        if objective == self.objective {
            return None;
        }
        self.objective = objective;
        Some(self.refetch())
    }

    pub fn set_grouping(&mut self, grouping: Labels) -> Option<Refetch> {
        if grouping == self.grouping {
            return None;
        }
        self.grouping = grouping;
        Some(self.refetch())
    }

    fn refetch(&mut self) -> Refetch {
        Refetch {
            alerts: self.request_alerts(),
            graphs: self.sync_graphs(),
        }
    }

    /// Move the visible range; visible graphs refetch
    pub fn set_range(&mut self, range: TimeRange) -> Vec<BurnratesFetch> {
        self.range = range;
        self.sync_graphs()
    }

    /// Apply an alert list response.
    ///
    /// A failure keeps the previous list. On success the list is replaced
    /// and the graph fetches that became necessary are returned.
    pub fn apply_alerts(
        &mut self,
        generation: u64,
        result: Result<GetAlertsResponse, ServiceError>,
    ) -> Vec<BurnratesFetch> {
        if generation != self.generation {
            debug!(
                "Discarding alerts for generation {} (current {})",
                generation, self.generation
            );
            counter!(FETCH_COUNTER, "kind" => "alerts", "outcome" => "stale").increment(1);
            return Vec::new();
        }

        let alerts = match result {
            Ok(response) => response.alerts,
            Err(e) => {
                warn!("Alert list fetch failed: {}", e);
                counter!(FETCH_COUNTER, "kind" => "alerts", "outcome" => "error").increment(1);
                return Vec::new();
            }
        };
        counter!(FETCH_COUNTER, "kind" => "alerts", "outcome" => "ok").increment(1);

        let keys = AlertKey::for_alerts(&self.objective.labels, &alerts);
        let mut previous = std::mem::take(&mut self.graphs);
        for key in &keys {
            let graph = previous.remove(key).unwrap_or_default();
            self.graphs.insert(key.clone(), graph);
        }
        // Graphs of vanished alerts drop here, releasing their subscriptions
        drop(previous);

        info!("{} alerts for {}", alerts.len(), self.objective.labels);
        self.alerts = alerts;
        self.keys = keys;
        self.sync_graphs()
    }

    /// Apply a burn-rate response for one row. Returns false when it is stale
    /// or the row no longer exists.
    pub fn apply_burnrates(
        &mut self,
        key: &AlertKey,
        generation: u64,
        result: Result<GraphBurnratesResponse, ServiceError>,
    ) -> bool {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        let applied = self
            .graphs
            .get_mut(key)
            .is_some_and(|graph| graph.apply(generation, result));

        let outcome = if applied { outcome } else { "stale" };
        counter!(FETCH_COUNTER, "kind" => "burnrates", "outcome" => outcome).increment(1);
        applied
    }

    /// Show firing alerts' graphs and hide the rest
    fn sync_graphs(&mut self) -> Vec<BurnratesFetch> {
        let mut fetches = Vec::new();
        let selector = self.objective.labels.selector();
        let grouping = self.grouping.selector();

        for (alert, key) in self.alerts.iter().zip(&self.keys) {
            let Some(graph) = self.graphs.get_mut(key) else {
                continue;
            };

            if !alert.state.is_firing() {
                if graph.is_visible() {
                    graph.hide();
                }
                continue;
            }

            graph.show(&self.bus);
            let deps = GraphDeps {
                selector: selector.clone(),
                grouping: grouping.clone(),
                range: self.range,
                short: alert.short.window,
                long: alert.long.window,
            };
            if let Some(fetch) = graph.update(deps) {
                fetches.push(BurnratesFetch {
                    key: key.clone(),
                    fetch,
                });
            }
        }

        fetches
    }

    /// One row pair per alert, in list order
    pub fn rows(&self) -> Vec<AlertTableRow> {
        self.alerts
            .iter()
            .zip(&self.keys)
            .map(|(alert, key)| {
                let graph = self.graphs.get(key);
                AlertTableRow {
                    key: key.to_string(),
                    summary: AlertRow::new(&self.objective, alert, &self.link),
                    graph: GraphRow {
                        visible: alert.state.is_firing(),
                        status: graph.map_or(GraphStatus::Idle, |g| g.status()),
                        frame: graph.and_then(|g| {
                            g.plot(Some(threshold(alert.factor, self.objective.target)))
                        }),
                    },
                }
            })
            .collect()
    }

    /// Fetch the alert list and every resulting graph, one after another
    pub async fn refresh<C: ObjectiveService>(&mut self, client: &C) {
        let fetch = self.request_alerts();
        let result = client.get_alerts(fetch.request).await;

        for graph in self.apply_alerts(fetch.generation, result) {
            let result = client.graph_burnrates(graph.fetch.request).await;
            self.apply_burnrates(&graph.key, graph.fetch.generation, result);
        }
    }
}
