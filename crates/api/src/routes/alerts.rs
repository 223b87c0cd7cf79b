//! Alert Routes

use axum::{
    extract::{Query, State},
    Json,
};
use alerting::{AlertListController, AlertTableRow, TimeRange};
use metrics::counter;
use objective_service::ObjectiveService;
use objectives::{Labels, ListRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{ApiError, AppState};

/// Query parameters for the alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Objective selector, e.g. `{__name__="api-availability"}`
    pub expr: String,
    /// Grouping selector; empty for no grouping
    #[serde(default)]
    pub grouping: Option<String>,
    /// Range start (ms since epoch)
    pub from: Option<i64>,
    /// Range end (ms since epoch)
    pub to: Option<i64>,
}

/// Response for the alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub objective: String,
    pub from: i64,
    pub to: i64,
    pub rows: Vec<AlertTableRow>,
}

/// Alert table of one objective, with graphs for firing alerts
pub async fn get_alerts<C>(
    State(state): State<Arc<AppState<C>>>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<AlertsResponse>, ApiError>
where
    C: ObjectiveService + Send + Sync + 'static,
{
    counter!("slo_dashboard_api_requests_total", "route" => "alerts").increment(1);

    let selector = Labels::parse_selector(&params.expr)?;
    let grouping = match params.grouping.as_deref().map(str::trim) {
        Some(g) if !g.is_empty() => Labels::parse_selector(g)?,
        _ => Labels::new(),
    };
    let range = match (params.from, params.to) {
        (Some(from), Some(to)) => TimeRange::new(from, to)?,
        (None, None) => state
            .config
            .alerting
            .default_range(chrono::Utc::now().timestamp_millis())?,
        _ => {
            return Err(ApiError::BadRequest(
                "from and to must be given together".to_string(),
            ))
        }
    };

    let objective = state
        .client
        .list_objectives(ListRequest {
            expr: selector.selector(),
            grouping: String::new(),
        })
        .await?
        .objectives
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(selector.selector()))?;
    debug!("Resolved objective {}", objective.labels);

    let mut list = AlertListController::new(
        objective,
        grouping,
        range,
        state.link.clone(),
        state.bus.clone(),
    );
    list.refresh(&state.client).await;

    Ok(Json(AlertsResponse {
        objective: list.objective().labels.selector(),
        from: range.from_ms(),
        to: range.to_ms(),
        rows: list.rows(),
    }))
}
