//! Dashboard Server Configuration
//!
//! Loaded in layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`SLO_DASHBOARD_CONFIG`, default `config/dashboard.toml`),
//!    optional
//! 3. `SLO_DASHBOARD__*` environment variables, `__` separating sections,
//!    e.g. `SLO_DASHBOARD__SERVICE__BASE_URL`

use alerting::AlertingConfig;
use config::{Config, ConfigError, Environment, File};
use objective_service::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    /// Objective service client
    pub service: HttpConfig,
    pub alerting: AlertingConfig,
    pub logging: LoggingConfig,
    /// Serve the built-in demo objective instead of calling the service
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load from `path` (if it exists) plus environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(&path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("SLO_DASHBOARD").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load from the file named by `SLO_DASHBOARD_CONFIG`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SLO_DASHBOARD_CONFIG")
            .unwrap_or_else(|_| "config/dashboard.toml".to_string());
        Self::from_file(path)
    }
}
