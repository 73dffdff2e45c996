//! Configuration Loader
//!
//! Loads configuration from multiple sources with precedence: base config,
//! then each existing config file in order, then environment variables.

use crate::config::{ConfigFile, TripcheckConfig};
use crate::error::{Result, TripError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE_NAMES: [&str; 3] = ["tripcheck.json", "tripcheck.yaml", "tripcheck.yml"];

/// Configuration loader that handles multiple sources with precedence
pub struct ConfigLoader {
    /// Base configuration
    base_config: TripcheckConfig,
    /// Configuration file paths to try in order
    config_paths: Vec<PathBuf>,
    /// Paths that must exist and parse
    required_paths: Vec<PathBuf>,
    /// Whether to load from environment variables
    load_from_env: bool,
    /// Whether to validate the final configuration
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_config: TripcheckConfig::default(),
            config_paths: Self::get_default_config_paths(),
            required_paths: Vec::new(),
            load_from_env: true,
            validate: true,
        }
    }

    /// Set the base configuration
    #[must_use]
    pub fn with_base_config(mut self, config: TripcheckConfig) -> Self {
        self.base_config = config;
        self
    }

    /// Add a configuration file that must exist and parse
    ///
    /// It is applied after every other file.
    #[must_use]
    pub fn require_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        self.config_paths.push(path.clone());
        self.required_paths.push(path);
        self
    }

    /// Set configuration file paths
    #[must_use]
    pub fn with_config_paths<P: AsRef<Path>>(mut self, paths: Vec<P>) -> Self {
        self.config_paths = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        self
    }

    /// Enable or disable loading from environment variables
    #[must_use]
    pub fn with_env_loading(mut self, enabled: bool) -> Self {
        self.load_from_env = enabled;
        self
    }

    /// Enable or disable configuration validation
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Load configuration from all sources
    ///
    /// An optional file that exists but does not parse is skipped with a
    /// warning.
    ///
    /// # Errors
    /// Returns an error if a required file is missing or unparseable, an
    /// environment variable is invalid or the final configuration fails
    /// validation
    pub fn load(&self) -> Result<TripcheckConfig> {
        let mut config = self.base_config.clone();
        debug!("Starting configuration loading process");

        for path in &self.config_paths {
            let required = self.required_paths.contains(path);
            if !path.exists() {
                if required {
                    return Err(TripError::configuration(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!("Configuration file not found: {}", path.display());
                continue;
            }
            match ConfigFile::from_file(path) {
                Ok(file) => {
                    config.apply_file(&file);
                    info!("Loaded configuration from: {}", path.display());
                }
                Err(e) if required => return Err(e),
                Err(e) => {
                    warn!(
                        "Failed to load configuration from {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        if self.load_from_env {
            debug!("Loading configuration from environment variables");
            config.apply_env()?;
        }

        if self.validate {
            config.validate()?;
            debug!("Configuration validation passed");
        }

        Ok(config)
    }

    /// Get the default configuration file paths to try
    #[must_use]
    pub fn get_default_config_paths() -> Vec<PathBuf> {
        let user_dir = Self::get_user_config_dir();
        CONFIG_FILE_NAMES
            .iter()
            .map(PathBuf::from)
            .chain(CONFIG_FILE_NAMES.iter().map(|name| user_dir.join(name)))
            .collect()
    }

    /// Get the user configuration directory
    #[must_use]
    pub fn get_user_config_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config").join("tripcheck")
        } else if let Ok(userprofile) = std::env::var("USERPROFILE") {
            // Windows
            PathBuf::from(userprofile)
                .join("AppData")
                .join("Roaming")
                .join("tripcheck")
        } else {
            PathBuf::from("~/.config/tripcheck")
        }
    }

}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
