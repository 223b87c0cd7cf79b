//! SLO Dashboard - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, DashboardConfig};
use objective_service::{HttpObjectiveService, MockObjectiveService};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("loading configuration")?;
    init_logging(&config.logging).context("installing tracing subscriber")?;

    info!("=== SLO Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    if config.demo {
        info!("Serving the built-in demo objective");
        run_server(MockObjectiveService::demo(), config).await
    } else {
        info!("Objective service at {}", config.service.base_url);
        let client = HttpObjectiveService::new(config.service.clone())?;
        run_server(client, config).await
    }
}
