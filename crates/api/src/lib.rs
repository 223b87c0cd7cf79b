//! SLO Dashboard API Server
//!
//! Serves the burn-rate alert table of an objective, including the graphs of
//! firing alerts, as JSON.

use alerting::{PrometheusLink, ResizeBus};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use objective_service::ObjectiveService;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
mod error;
mod routes;

pub use crate::config::{DashboardConfig, LoggingConfig, ServerConfig};
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState<C> {
    /// Objective service client
    pub client: C,
    pub config: DashboardConfig,
    pub link: PrometheusLink,
    /// Width source for graphs built by handlers
    pub bus: ResizeBus,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl<C> AppState<C> {
    /// Create new application state
    pub fn new(client: C, config: DashboardConfig) -> Result<Self, ApiError> {
        let link = PrometheusLink::new(&config.alerting.prometheus_url)?;
        let bus = ResizeBus::new(config.alerting.default_width);
        Ok(Self {
            client,
            config,
            link,
            bus,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router<C>(state: Arc<AppState<C>>) -> Router
where
    C: ObjectiveService + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/health", get(health_handler::<C>))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts::<C>))
        .route("/metrics", get(metrics_handler::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler<C>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse
where
    C: Send + Sync + 'static,
{
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus text exposition
async fn metrics_handler<C>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Send + Sync + 'static,
{
    let handle = state.metrics.as_ref().ok_or(ApiError::MetricsUnavailable)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// Initialize logging; `RUST_LOG` overrides the configured level
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    }
}

/// Run the server until it fails
pub async fn run_server<C>(client: C, config: DashboardConfig) -> anyhow::Result<()>
where
    C: ObjectiveService + Send + Sync + 'static,
{
    let addr = config.server.bind_address.clone();
    let mut state = AppState::new(client, config)?;
    if let Some(handle) = init_metrics() {
        state = state.with_metrics(handle);
    }
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
