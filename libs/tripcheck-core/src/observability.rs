//! Observability: structured logging and health reporting
//!
//! Logs go to stderr as text or JSON. When a log directory is configured, a
//! JSON copy is also written to a daily rolling file through a non-blocking
//! writer whose guard lives in the [`ObservabilityManager`].

use crate::config::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Error types for observability operations
#[derive(Error, Debug)]
pub enum ObservabilityError {
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),
}

/// Result type for observability operations
pub type Result<T> = std::result::Result<T, ObservabilityError>;

/// Configuration for observability features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable JSON logging format on stderr
    pub json_logs: bool,
    /// Directory for daily rolling JSON log files
    pub log_dir: Option<PathBuf>,
    /// Service name reported by health checks
    pub service_name: String,
    /// Service version
    pub service_version: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            log_dir: None,
            service_name: "tripcheck".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl From<&LoggingConfig> for ObservabilityConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            log_level: logging.level.clone(),
            json_logs: logging.json_logs,
            log_dir: logging.log_dir.clone(),
            ..Self::default()
        }
    }
}

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub uptime_secs: u64,
    pub checks: BTreeMap<String, CheckResult>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String,
    pub message: Option<String>,
}

/// Observability manager
#[derive(Debug)]
pub struct ObservabilityManager {
    config: ObservabilityConfig,
    start_time: Instant,
    file_guard: Option<WorkerGuard>,
}

impl ObservabilityManager {
    /// Create a new observability manager
    ///
    /// # Errors
    /// Returns an error if the configured log level is invalid
    pub fn new(config: ObservabilityConfig) -> Result<Self> {
        config
            .log_level
            .parse::<Level>()
            .map_err(|e| ObservabilityError::TracingInit(format!("Invalid log level: {e}")))?;

        Ok(Self {
            config,
            start_time: Instant::now(),
            file_guard: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ObservabilityConfig {
        &self.config
    }

    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` overrides the configured level when set.
    ///
    /// # Errors
    /// Returns an error if a global subscriber is already installed
    pub fn initialize(&mut self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.log_level));

        let json_layer = self.config.json_logs.then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
        });
        let text_layer = (!self.config.json_logs).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
        });

        let file_layer = self.config.log_dir.as_ref().map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, "tripcheck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            self.file_guard = Some(guard);
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(text_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;

        info!("Tracing initialized with level: {}", self.config.log_level);
        Ok(())
    }

    /// Get health status; `database` is `None` when no store is configured
    #[must_use]
    pub fn health_status(&self, database: Option<bool>) -> HealthStatus {
        let mut checks = BTreeMap::new();
        let database_check = match database {
            Some(true) => CheckResult {
                status: "healthy".to_string(),
                message: Some("Database connection is healthy".to_string()),
            },
            Some(false) => CheckResult {
                status: "unhealthy".to_string(),
                message: Some("Database connection check failed".to_string()),
            },
            None => CheckResult {
                status: "disabled".to_string(),
                message: Some("No database configured".to_string()),
            },
        };
        let healthy = database != Some(false);
        checks.insert("database".to_string(), database_check);

        HealthStatus {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            service: self.config.service_name.clone(),
            timestamp: chrono::Utc::now(),
            version: self.config.service_version.clone(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            checks,
        }
    }
}
