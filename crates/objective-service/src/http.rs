//! HTTP Client for the Objective Service
//!
//! Speaks the connect protocol's unary JSON mode: every method is a POST of
//! the JSON request to `{base}/objectives.v1alpha1.ObjectiveService/{Method}`.

use crate::{ObjectiveService, ServiceError, SERVICE_NAME};
use objectives::{
    GetAlertsRequest, GetAlertsResponse, GraphBurnratesRequest, GraphBurnratesResponse,
    ListRequest, ListResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the objective service API
    pub base_url: Url,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:9099/").expect("static URL is valid"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Error body of the connect protocol
#[derive(Debug, Deserialize)]
struct ConnectError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Objective service over HTTP
#[derive(Debug, Clone)]
pub struct HttpObjectiveService {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpObjectiveService {
    /// Create a client; no connection is made until the first call
    pub fn new(config: HttpConfig) -> Result<Self, ServiceError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!("Objective service client for {}", base_url);
        Ok(Self {
            base_url,
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, method: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(&format!("{}/{}", SERVICE_NAME, method))
            .map_err(|e| ServiceError::InvalidEndpoint(e.to_string()))
    }

    async fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(method)?;
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header("Connect-Protocol-Version", "1")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout.as_millis() as u64)
        } else {
            err.into()
        }
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> ServiceError {
    match serde_json::from_slice::<ConnectError>(body) {
        Ok(err) if !err.code.is_empty() => ServiceError::Status {
            code: err.code,
            message: err.message,
        },
        _ => ServiceError::Status {
            code: status.as_u16().to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

impl ObjectiveService for HttpObjectiveService {
    fn list_objectives(
        &self,
        request: ListRequest,
    ) -> impl Future<Output = Result<ListResponse, ServiceError>> + Send {
        async move { self.call("List", &request).await }
    }

    fn get_alerts(
        &self,
        request: GetAlertsRequest,
    ) -> impl Future<Output = Result<GetAlertsResponse, ServiceError>> + Send {
        async move { self.call("GetAlerts", &request).await }
    }

    fn graph_burnrates(
        &self,
        request: GraphBurnratesRequest,
    ) -> impl Future<Output = Result<GraphBurnratesResponse, ServiceError>> + Send {
        async move { self.call("GraphBurnrates", &request).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::{TimeZone, Utc};
    use objectives::{AlertState, Current};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}/api", addr)).unwrap()
    }

    fn client(base_url: Url) -> HttpObjectiveService {
        HttpObjectiveService::new(HttpConfig {
            base_url,
            timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_alerts_over_http() {
        let app = Router::new().route(
            "/api/objectives.v1alpha1.ObjectiveService/GetAlerts",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["expr"], r#"{slo="api"}"#);
                assert_eq!(body["inactive"], true);
                Json(json!({
                    "alerts": [{
                        "state": "firing",
                        "severity": "critical",
                        "factor": 14,
                        "for": "120s",
                        "short": {"window": "300s", "current": -1, "query": "s"},
                        "long": {"window": "3600s", "query": "l"}
                    }]
                }))
            }),
        );
        let client = client(serve(app).await);

        let response = client
            .get_alerts(GetAlertsRequest {
                expr: r#"{slo="api"}"#.into(),
                grouping: "{}".into(),
                inactive: true,
                current: true,
            })
            .await
            .unwrap();

        assert_eq!(response.alerts.len(), 1);
        let alert = &response.alerts[0];
        assert_eq!(alert.state, AlertState::Firing);
        assert_eq!(alert.short.current, Current::NoData);
        assert_eq!(alert.long.current, Current::NotComputed);
    }

    #[tokio::test]
    async fn test_graph_burnrates_over_http() {
        let app = Router::new().route(
            "/api/objectives.v1alpha1.ObjectiveService/GraphBurnrates",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["short"], "300s");
                Json(json!({
                    "timeseries": [{
                        "labels": ["{window=\"5m\"}"],
                        "series": [{"values": [1, 2]}, {"values": [0.5, "NaN"]}]
                    }]
                }))
            }),
        );
        let client = client(serve(app).await);

        let response = client
            .graph_burnrates(GraphBurnratesRequest {
                expr: "{}".into(),
                grouping: "{}".into(),
                start: Utc.timestamp_opt(0, 0).unwrap(),
                end: Utc.timestamp_opt(3600, 0).unwrap(),
                short: Duration::from_secs(300),
                long: Duration::from_secs(3600),
            })
            .await
            .unwrap();

        let series = &response.timeseries[0].series;
        assert_eq!(series[0].values, vec![1.0, 2.0]);
        assert!(series[1].values[1].is_nan());
    }

    #[tokio::test]
    async fn test_connect_error_body() {
        let app = Router::new().route(
            "/api/objectives.v1alpha1.ObjectiveService/List",
            post(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"code": "not_found", "message": "no objective"})),
                )
            }),
        );
        let client = client(serve(app).await);

        let err = client
            .list_objectives(ListRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                code: "not_found".into(),
                message: "no objective".into()
            }
        );
    }

    #[tokio::test]
    async fn test_plain_error_body() {
        let app = Router::new().route(
            "/api/objectives.v1alpha1.ObjectiveService/List",
            post(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }),
        );
        let client = client(serve(app).await);

        match client.list_objectives(ListRequest::default()).await {
            Err(ServiceError::Status { code, message }) => {
                assert_eq!(code, "502");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Port 9 (discard) is not listening on loopback in test environments
        let client = client(Url::parse("http://127.0.0.1:9/").unwrap());
        let err = client.list_objectives(ListRequest::default()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Transport(_) | ServiceError::Timeout(_)
        ));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = client(Url::parse("http://slo.example.com/api").unwrap());
        assert_eq!(client.base_url().as_str(), "http://slo.example.com/api/");
        assert_eq!(
            client.endpoint("GetAlerts").unwrap().as_str(),
            "http://slo.example.com/api/objectives.v1alpha1.ObjectiveService/GetAlerts"
        );
    }
}
