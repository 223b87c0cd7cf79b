//! Scripted Objective Service
//!
//! Answers from queued one-shot responses first, then from a steady
//! response. Responses can be delayed to reproduce out-of-order arrival.

use crate::{ObjectiveService, ServiceError};
use objectives::wire::format_duration;
use objectives::{
    Alert, AlertState, Current, GetAlertsRequest, GetAlertsResponse, GraphBurnratesRequest,
    GraphBurnratesResponse, Labels, ListRequest, ListResponse, Objective, Series, Timeseries,
    WindowSample,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Points generated per synthetic burn-rate series
const SYNTHETIC_POINTS: usize = 120;

struct Scripted<T> {
    result: Result<T, ServiceError>,
    delay: Duration,
}

/// Steady burn-rate answer once the script is exhausted
enum SteadyBurnrates {
    Fixed(Vec<Timeseries>),
    /// Generate a short and a long series over the requested range
    Synthetic,
}

/// In-memory objective service for tests and offline runs
pub struct MockObjectiveService {
    objectives: Mutex<Vec<Objective>>,
    steady_alerts: Mutex<Vec<Alert>>,
    scripted_alerts: Mutex<VecDeque<Scripted<Vec<Alert>>>>,
    steady_burnrates: Mutex<SteadyBurnrates>,
    scripted_burnrates: Mutex<VecDeque<Scripted<Vec<Timeseries>>>>,
    alert_requests: Mutex<Vec<GetAlertsRequest>>,
    graph_requests: Mutex<Vec<GraphBurnratesRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not poison the mock for the others
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockObjectiveService {
    /// Empty service: no objectives, no alerts, empty graphs
    pub fn new() -> Self {
        Self {
            objectives: Mutex::new(Vec::new()),
            steady_alerts: Mutex::new(Vec::new()),
            scripted_alerts: Mutex::new(VecDeque::new()),
            steady_burnrates: Mutex::new(SteadyBurnrates::Fixed(Vec::new())),
            scripted_burnrates: Mutex::new(VecDeque::new()),
            alert_requests: Mutex::new(Vec::new()),
            graph_requests: Mutex::new(Vec::new()),
        }
    }

    /// A 99% / 28 day objective with the usual four multi-window alerts,
    /// the fastest one firing, and synthetic burn-rate graphs
    pub fn demo() -> Self {
        let labels = Labels::new()
            .with("__name__", "api-availability")
            .with("namespace", "default");
        let objective = Objective::new(labels.clone(), 0.99, Duration::from_secs(28 * 24 * 3600));

        let alert = |state, severity: &str, factor, for_secs, short: u64, long: u64, current| Alert {
            labels: labels.clone(),
            state,
            severity: severity.to_string(),
            factor,
            for_duration: Duration::from_secs(for_secs),
            short: WindowSample::new(
                Duration::from_secs(short),
                current,
                format!("api:burnrate{}", format_duration(Duration::from_secs(short))),
            ),
            long: WindowSample::new(
                Duration::from_secs(long),
                current,
                format!("api:burnrate{}", format_duration(Duration::from_secs(long))),
            ),
        };

        let alerts = vec![
            alert(AlertState::Firing, "critical", 14.0, 120, 300, 3600, Current::Value(0.21)),
            alert(AlertState::Pending, "critical", 7.0, 900, 1800, 21600, Current::Value(0.08)),
            alert(AlertState::Inactive, "warning", 2.0, 3600, 7200, 86400, Current::NoData),
            alert(AlertState::Inactive, "warning", 1.0, 10800, 21600, 345600, Current::NotComputed),
        ];

        let mock = Self::new()
            .with_objectives(vec![objective])
            .with_alerts(alerts);
        *lock(&mock.steady_burnrates) = SteadyBurnrates::Synthetic;
        mock
    }

    pub fn with_objectives(self, objectives: Vec<Objective>) -> Self {
        *lock(&self.objectives) = objectives;
        self
    }

    /// Steady alert list
    pub fn with_alerts(self, alerts: Vec<Alert>) -> Self {
        *lock(&self.steady_alerts) = alerts;
        self
    }

    /// Steady burn-rate response
    pub fn with_burnrates(self, timeseries: Vec<Timeseries>) -> Self {
        *lock(&self.steady_burnrates) = SteadyBurnrates::Fixed(timeseries);
        self
    }

    /// Queue a one-shot alert list answer
    pub fn push_alerts(&self, result: Result<Vec<Alert>, ServiceError>) {
        self.push_alerts_delayed(result, Duration::ZERO);
    }

    pub fn push_alerts_delayed(&self, result: Result<Vec<Alert>, ServiceError>, delay: Duration) {
        lock(&self.scripted_alerts).push_back(Scripted { result, delay });
    }

    /// Queue a one-shot burn-rate answer
    pub fn push_burnrates(&self, result: Result<Vec<Timeseries>, ServiceError>) {
        self.push_burnrates_delayed(result, Duration::ZERO);
    }

    pub fn push_burnrates_delayed(
        &self,
        result: Result<Vec<Timeseries>, ServiceError>,
        delay: Duration,
    ) {
        lock(&self.scripted_burnrates).push_back(Scripted { result, delay });
    }

    /// Alert requests received so far
    pub fn alert_requests(&self) -> Vec<GetAlertsRequest> {
        lock(&self.alert_requests).clone()
    }

    /// Graph requests received so far
    pub fn graph_requests(&self) -> Vec<GraphBurnratesRequest> {
        lock(&self.graph_requests).clone()
    }

    fn next_alerts(&self, request: GetAlertsRequest) -> Scripted<Vec<Alert>> {
        lock(&self.alert_requests).push(request);
        lock(&self.scripted_alerts)
            .pop_front()
            .unwrap_or_else(|| Scripted {
                result: Ok(lock(&self.steady_alerts).clone()),
                delay: Duration::ZERO,
            })
    }

    fn next_burnrates(&self, request: GraphBurnratesRequest) -> Scripted<Vec<Timeseries>> {
        lock(&self.graph_requests).push(request.clone());
        if let Some(scripted) = lock(&self.scripted_burnrates).pop_front() {
            return scripted;
        }
        let result = match &*lock(&self.steady_burnrates) {
            SteadyBurnrates::Fixed(timeseries) => timeseries.clone(),
            SteadyBurnrates::Synthetic => synthetic_burnrates(&request),
        };
        Scripted {
            result: Ok(result),
            delay: Duration::ZERO,
        }
    }
}

impl Default for MockObjectiveService {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectiveService for MockObjectiveService {
    fn list_objectives(
        &self,
        request: ListRequest,
    ) -> impl Future<Output = Result<ListResponse, ServiceError>> + Send {
        let result = match Labels::parse_selector(&request.expr) {
            Ok(selector) => {
                let objectives = lock(&self.objectives)
                    .iter()
                    .filter(|o| selector.iter().all(|(k, v)| o.labels.get(k) == Some(v)))
                    .cloned()
                    .collect();
                Ok(ListResponse { objectives })
            }
            Err(e) => Err(ServiceError::Status {
                code: "invalid_argument".into(),
                message: e.to_string(),
            }),
        };
        async move { result }
    }

    fn get_alerts(
        &self,
        request: GetAlertsRequest,
    ) -> impl Future<Output = Result<GetAlertsResponse, ServiceError>> + Send {
        let scripted = self.next_alerts(request);
        async move {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            debug!("Mock alerts answered");
            scripted.result.map(|alerts| GetAlertsResponse { alerts })
        }
    }

    fn graph_burnrates(
        &self,
        request: GraphBurnratesRequest,
    ) -> impl Future<Output = Result<GraphBurnratesResponse, ServiceError>> + Send {
        let scripted = self.next_burnrates(request);
        async move {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            debug!("Mock burnrates answered");
            scripted
                .result
                .map(|timeseries| GraphBurnratesResponse { timeseries })
        }
    }
}

/// Deterministic short/long burn-rate curves over the requested range
fn synthetic_burnrates(request: &GraphBurnratesRequest) -> Vec<Timeseries> {
    let start = request.start.timestamp() as f64;
    let end = request.end.timestamp() as f64;
    if end <= start {
        return Vec::new();
    }

    let step = (end - start) / (SYNTHETIC_POINTS - 1) as f64;
    let timestamps: Vec<f64> = (0..SYNTHETIC_POINTS)
        .map(|i| start + step * i as f64)
        .collect();

    let curve = |window: Duration, amplitude: f64| {
        let period = window.as_secs_f64().max(1.0) * 4.0;
        let values = timestamps
            .iter()
            .map(|t| amplitude * (1.0 + (t / period * std::f64::consts::TAU).sin()) / 2.0)
            .collect();
        Timeseries {
            labels: vec![format!("{{window=\"{}\"}}", format_duration(window))],
            query: String::new(),
            series: vec![Series::new(timestamps.clone()), Series::new(values)],
        }
    };

    vec![curve(request.short, 0.3), curve(request.long, 0.15)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn graph_request() -> GraphBurnratesRequest {
        GraphBurnratesRequest {
            expr: "{}".into(),
            grouping: "{}".into(),
            start: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            end: Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
            short: Duration::from_secs(300),
            long: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn test_scripted_then_steady() {
        let mock = MockObjectiveService::new().with_alerts(vec![Alert::default()]);
        mock.push_alerts(Err(ServiceError::Transport("down".into())));

        assert!(mock.get_alerts(GetAlertsRequest::default()).await.is_err());
        let steady = mock.get_alerts(GetAlertsRequest::default()).await.unwrap();
        assert_eq!(steady.alerts.len(), 1);
        assert_eq!(mock.alert_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_response() {
        let mock = MockObjectiveService::new();
        mock.push_burnrates_delayed(Ok(vec![Timeseries::default()]), Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let response = mock.graph_burnrates(graph_request()).await.unwrap();
        assert_eq!(response.timeseries.len(), 1);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_demo_service() {
        let mock = MockObjectiveService::demo();

        let objectives = mock
            .list_objectives(ListRequest {
                expr: r#"{__name__="api-availability"}"#.into(),
                grouping: String::new(),
            })
            .await
            .unwrap()
            .objectives;
        assert_eq!(objectives.len(), 1);
        assert_eq!(objectives[0].target, 0.99);

        let alerts = mock.get_alerts(GetAlertsRequest::default()).await.unwrap().alerts;
        assert_eq!(alerts.len(), 4);
        assert_eq!(
            alerts.iter().filter(|a| a.state.is_firing()).count(),
            1
        );

        let graphs = mock.graph_burnrates(graph_request()).await.unwrap().timeseries;
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].series[0].values.len(), SYNTHETIC_POINTS);
        assert_eq!(graphs[0].labels, vec![r#"{window="300s"}"#]);
        assert!(graphs[1].series[1].values.iter().all(|v| (0.0..=0.15).contains(v)));
    }

    #[tokio::test]
    async fn test_list_filters_by_selector() {
        let mock = MockObjectiveService::demo();
        let none = mock
            .list_objectives(ListRequest {
                expr: r#"{__name__="other"}"#.into(),
                grouping: String::new(),
            })
            .await
            .unwrap();
        assert!(none.objectives.is_empty());

        let bad = mock
            .list_objectives(ListRequest {
                expr: "not a selector".into(),
                grouping: String::new(),
            })
            .await;
        assert!(matches!(bad, Err(ServiceError::Status { .. })));
    }
}
