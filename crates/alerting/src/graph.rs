//! Burn-Rate Graph Controller
//!
//! Owns one firing alert's graph: decides when its burn rates must be
//! fetched, accepts only the response to the latest request, and produces the
//! frame to draw.

use crate::{PlotFrame, ResizeBus, ResizeSubscription, TimeRange, DEFAULT_WIDTH};
use burnrate::{align, AlignedBurnrates};
use objective_service::ServiceError;
use objectives::{GraphBurnratesRequest, GraphBurnratesResponse};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Inputs that trigger a refetch when any of them changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDeps {
    /// Objective selector
    pub selector: String,
    /// Grouping selector
    pub grouping: String,
    pub range: TimeRange,
    pub short: Duration,
    pub long: Duration,
}

impl GraphDeps {
    /// Same series, possibly over another range
    fn same_series(&self, other: &GraphDeps) -> bool {
        self.selector == other.selector
            && self.grouping == other.grouping
            && self.short == other.short
            && self.long == other.long
    }

    fn request(&self) -> GraphBurnratesRequest {
        GraphBurnratesRequest {
            expr: self.selector.clone(),
            grouping: self.grouping.clone(),
            start: self.range.start(),
            end: self.range.end(),
            short: self.short,
            long: self.long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStatus {
    /// Not shown; nothing fetched or held
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the placeholder is shown
    Error,
}

/// A burn-rate request to issue, tagged with the generation it answers
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFetch {
    pub generation: u64,
    pub request: GraphBurnratesRequest,
}

/// Graph state of one alert row
#[derive(Debug)]
pub struct BurnrateGraphController {
    deps: Option<GraphDeps>,
    status: GraphStatus,
    generation: u64,
    burnrates: Option<AlignedBurnrates>,
    subscription: Option<ResizeSubscription>,
}

impl BurnrateGraphController {
    pub fn new() -> Self {
        Self {
            deps: None,
            status: GraphStatus::Idle,
            generation: 0,
            burnrates: None,
            subscription: None,
        }
    }

    pub fn status(&self) -> GraphStatus {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status == GraphStatus::Loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn burnrates(&self) -> Option<&AlignedBurnrates> {
        self.burnrates.as_ref()
    }

    /// Start following the container width
    pub fn show(&mut self, bus: &ResizeBus) {
        if self.subscription.is_none() {
            self.subscription = Some(bus.subscribe());
        }
    }

    /// Stop following resizes and drop everything fetched.
    ///
    /// A response still in flight is discarded when it arrives.
    pub fn hide(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Graph hidden at generation {}", self.generation);
        }
        self.generation += 1;
        self.deps = None;
        self.burnrates = None;
        self.status = GraphStatus::Idle;
    }

    /// Record the current inputs; returns a fetch when they changed.
    ///
    /// Hidden graphs never fetch.
    pub fn update(&mut self, deps: GraphDeps) -> Option<GraphFetch> {
        if !self.is_visible() {
            return None;
        }
        if self.deps.as_ref() == Some(&deps) {
            return None;
        }

        if !self.deps.as_ref().is_some_and(|old| old.same_series(&deps)) {
            self.burnrates = None;
        }
        self.generation += 1;
        self.status = GraphStatus::Loading;
        let request = deps.request();
        self.deps = Some(deps);

        debug!(
            "Fetching burn rates {} ({:?}/{:?}), generation {}",
            request.expr, request.short, request.long, self.generation
        );
        Some(GraphFetch {
            generation: self.generation,
            request,
        })
    }

    /// Apply a burn-rate response. Returns false for a stale response.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<GraphBurnratesResponse, ServiceError>,
    ) -> bool {
        if generation != self.generation || self.status != GraphStatus::Loading {
            debug!(
                "Discarding burn rates for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }

        match result {
            Ok(response) => {
                self.burnrates = Some(align(&response.timeseries));
                self.status = GraphStatus::Ready;
            }
            Err(e) => {
                warn!("Burn-rate fetch failed: {}", e);
                self.burnrates = None;
                self.status = GraphStatus::Error;
            }
        }
        true
    }

    /// Width the graph is drawn at
    pub fn width(&self) -> u32 {
        self.subscription
            .as_ref()
            .map(ResizeSubscription::width)
            .unwrap_or(DEFAULT_WIDTH)
    }

    /// Frame to draw with a threshold line; `None` while hidden
    pub fn plot(&self, threshold: Option<f64>) -> Option<PlotFrame> {
        if !self.is_visible() {
            return None;
        }
        let range = self.deps.as_ref()?.range;
        let (from_ms, to_ms) = (range.from_ms(), range.to_ms());

        let mut frame = match &self.burnrates {
            Some(burnrates) => {
                PlotFrame::burnrates(self.width(), from_ms, to_ms, burnrates, threshold)
            }
            None => PlotFrame::placeholder(self.width(), from_ms, to_ms),
        };
        frame.loading = self.is_loading();
        Some(frame)
    }
}

impl Default for BurnrateGraphController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectives::{Series, Timeseries};

    fn deps(from_ms: i64, to_ms: i64) -> GraphDeps {
        GraphDeps {
            selector: r#"{__name__="api"}"#.into(),
            grouping: "{}".into(),
            range: TimeRange::new(from_ms, to_ms).unwrap(),
            short: Duration::from_secs(300),
            long: Duration::from_secs(3600),
        }
    }

    fn response() -> GraphBurnratesResponse {
        let ts = vec![1000.0, 1003.6, 1007.2];
        GraphBurnratesResponse {
            timeseries: vec![Timeseries {
                labels: vec![r#"{window="5m"}"#.into()],
                query: String::new(),
                series: vec![Series::new(ts), Series::new(vec![0.1, 0.2, 0.3])],
            }],
        }
    }

    fn visible(bus: &ResizeBus) -> BurnrateGraphController {
        let mut graph = BurnrateGraphController::new();
        graph.show(bus);
        graph
    }

    #[test]
    fn test_fetch_once_per_dependency_change() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);

        let fetch = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        assert_eq!(graph.status(), GraphStatus::Loading);
        assert_eq!(fetch.request.expr, r#"{__name__="api"}"#);
        assert_eq!(fetch.request.start.timestamp(), 1000);
        assert_eq!(fetch.request.end.timestamp(), 4600);
        assert_eq!(fetch.request.short, Duration::from_secs(300));

        assert!(graph.update(deps(1_000_000, 4_600_000)).is_none());
        assert!(graph.update(deps(1_000_000, 4_700_000)).is_some());
    }

    #[test]
    fn test_loading_then_ready() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);

        let fetch = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        let loading = graph.plot(Some(0.14)).unwrap();
        assert!(loading.loading);
        assert!(loading.is_placeholder());

        assert!(graph.apply(fetch.generation, Ok(response())));
        assert_eq!(graph.status(), GraphStatus::Ready);

        let frame = graph.plot(Some(0.14)).unwrap();
        assert!(!frame.loading);
        assert_eq!(frame.data.timestamps(), &[1000.0, 1003.6, 1007.2]);
        assert_eq!(frame.options.series[0].label, "5m");
        assert_eq!(frame.overlay.threshold(), Some(0.14));
    }

    #[test]
    fn test_error_clears_data() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);

        let first = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        graph.apply(first.generation, Ok(response()));

        let second = graph.update(deps(2_000_000, 5_600_000)).unwrap();
        assert!(graph.apply(
            second.generation,
            Err(ServiceError::Transport("connection refused".into()))
        ));

        assert_eq!(graph.status(), GraphStatus::Error);
        assert!(graph.burnrates().is_none());
        let frame = graph.plot(None).unwrap();
        assert!(frame.is_placeholder());
        assert!(!frame.loading);
        assert_eq!((frame.options.x.min, frame.options.x.max), (2000.0, 5600.0));
    }

    #[test]
    fn test_other_series_drops_data_while_loading() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);
        let first = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        graph.apply(first.generation, Ok(response()));

        // Another range of the same series keeps the old data on screen
        graph.update(deps(2_000_000, 5_600_000)).unwrap();
        assert!(graph.burnrates().is_some());
        assert!(!graph.plot(None).unwrap().is_placeholder());

        let mut other = deps(2_000_000, 5_600_000);
        other.selector = r#"{__name__="web"}"#.into();
        let fetch = graph.update(other).unwrap();
        assert_eq!(fetch.request.expr, r#"{__name__="web"}"#);
        assert!(graph.burnrates().is_none());
        let frame = graph.plot(Some(0.7)).unwrap();
        assert!(frame.loading);
        assert!(frame.is_placeholder());
    }

    #[test]
    fn test_stale_response_discarded() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);

        let old = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        let new = graph.update(deps(2_000_000, 5_600_000)).unwrap();

        assert!(graph.apply(new.generation, Ok(GraphBurnratesResponse::default())));
        assert!(!graph.apply(old.generation, Ok(response())));
        assert_eq!(graph.burnrates().unwrap().data.timestamps().len(), 0);
    }

    #[test]
    fn test_hidden_graph_does_not_fetch() {
        let mut graph = BurnrateGraphController::new();
        assert!(graph.update(deps(1_000_000, 4_600_000)).is_none());
        assert!(graph.plot(None).is_none());
        assert_eq!(graph.status(), GraphStatus::Idle);
    }

    #[test]
    fn test_hide_releases_subscription_and_discards_in_flight() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);
        assert_eq!(bus.listener_count(), 1);

        let fetch = graph.update(deps(1_000_000, 4_600_000)).unwrap();
        graph.hide();
        assert_eq!(bus.listener_count(), 0);
        assert!(!graph.apply(fetch.generation, Ok(response())));
        assert!(graph.burnrates().is_none());

        // Shown again with the same inputs: fetched afresh
        graph.show(&bus);
        assert!(graph.update(deps(1_000_000, 4_600_000)).is_some());
    }

    #[test]
    fn test_width_follows_bus() {
        let bus = ResizeBus::default();
        let mut graph = visible(&bus);
        graph.update(deps(1_000_000, 4_600_000));

        bus.resize(1200);
        assert_eq!(graph.plot(None).unwrap().options.width, 1200);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let bus = ResizeBus::default();
        let graph = visible(&bus);
        assert_eq!(bus.listener_count(), 1);
        drop(graph);
        assert_eq!(bus.listener_count(), 0);
    }
}
