//! Configuration management for tripcheck
//!
//! Values come from defaults, JSON or YAML files and `TRIPCHECK_*`
//! environment variables. [`crate::config_loader::ConfigLoader`] applies them
//! in that order.

use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tripcheck_common::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_WEBHOOK_TIMEOUT_SECS};

/// Configuration for tripcheck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TripcheckConfig {
    /// Webhook that receives submissions
    pub webhook: WebhookConfig,
    /// Trip store
    pub database: DatabaseConfig,
    /// HTTP server
    pub server: ServerConfig,
    /// Logging
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook URL; submissions are unavailable without it
    pub url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
        }
    }
}

impl WebhookConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; trips are not persisted without it
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON logging
    pub json_logs: bool,
    /// Directory for daily rolling log files
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_logs: false,
            log_dir: None,
        }
    }
}

/// Contents of one configuration file
///
/// Every key is optional so a later file can set any value, including one
/// equal to the default, over an earlier file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub webhook: WebhookFile,
    pub database: DatabaseConfig,
    pub server: ServerFile,
    pub logging: LoggingFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebhookFile {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerFile {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingFile {
    pub level: Option<String>,
    pub json_logs: Option<bool>,
    pub log_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse a JSON or YAML file (by extension)
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TripError::Io(std::io::Error::other(format!(
                "Failed to read config file {}: {e}",
                path.display()
            )))
        })?;

        if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| {
                TripError::configuration(format!(
                    "Failed to parse YAML config {}: {e}",
                    path.display()
                ))
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                TripError::configuration(format!(
                    "Failed to parse JSON config {}: {e}",
                    path.display()
                ))
            })
        }
    }
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl TripcheckConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if environment variables contain invalid values
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with the `TRIPCHECK_*` environment variables that are set
    ///
    /// # Errors
    /// Returns an error if a numeric variable does not parse
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("TRIPCHECK_WEBHOOK_URL") {
            self.webhook.url = Some(url);
        }
        if let Ok(timeout) = std::env::var("TRIPCHECK_WEBHOOK_TIMEOUT") {
            self.webhook.timeout_secs = timeout
                .parse()
                .map_err(|_| TripError::configuration("Invalid TRIPCHECK_WEBHOOK_TIMEOUT value"))?;
        }
        if let Ok(path) = std::env::var("TRIPCHECK_DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Ok(host) = std::env::var("TRIPCHECK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TRIPCHECK_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| TripError::configuration("Invalid TRIPCHECK_PORT value"))?;
        }
        if let Ok(level) = std::env::var("TRIPCHECK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json_logs) = std::env::var("TRIPCHECK_JSON_LOGS") {
            self.logging.json_logs = parse_bool(&json_logs);
        }
        if let Ok(log_dir) = std::env::var("TRIPCHECK_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(log_dir));
        }
        Ok(())
    }

    /// Load configuration from a JSON or YAML file (by extension)
    ///
    /// Keys missing from the file keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::default();
        config.apply_file(&ConfigFile::from_file(path)?);
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.webhook.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(TripError::configuration(format!("Webhook URL must be http(s): {url}")));
            }
        }
        if self.webhook.timeout_secs == 0 {
            return Err(TripError::configuration("Webhook timeout must be greater than 0"));
        }
        if self.server.host.is_empty() {
            return Err(TripError::configuration("Server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(TripError::configuration("Server port must be greater than 0"));
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(TripError::configuration(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Override fields with every key the file sets, default-valued or not
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(url) = &file.webhook.url {
            self.webhook.url = Some(url.clone());
        }
        if let Some(timeout_secs) = file.webhook.timeout_secs {
            self.webhook.timeout_secs = timeout_secs;
        }
        if let Some(path) = &file.database.path {
            self.database.path = Some(path.clone());
        }
        if let Some(host) = &file.server.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = file.server.port {
            self.server.port = port;
        }
        if let Some(level) = &file.logging.level {
            self.logging.level.clone_from(level);
        }
        if let Some(json_logs) = file.logging.json_logs {
            self.logging.json_logs = json_logs;
        }
        if let Some(log_dir) = &file.logging.log_dir {
            self.logging.log_dir = Some(log_dir.clone());
        }
    }

    /// Webhook URL, or a configuration error when none is set
    ///
    /// # Errors
    /// Returns `TripError::Configuration` if no webhook URL is configured
    pub fn require_webhook_url(&self) -> Result<&str> {
        self.webhook.url.as_deref().ok_or_else(|| {
            TripError::configuration(
                "Webhook URL is not configured (set TRIPCHECK_WEBHOOK_URL or --webhook-url)",
            )
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml" | "yml")
    )
}

/// Parse a boolean value from a string
fn parse_bool(value: &str) -> bool {
    let lower = value.to_lowercase();
    matches!(lower.as_str(), "true" | "1" | "yes" | "on")
}
