use crate::logging;
use crate::mocks::registry::{DEFAULT_PRUNE_INTERVAL, REGISTRY_SOFT_LIMIT};
use crate::{MockError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".interpose.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// Registry size at which pruning of deactivated mocks starts
    #[serde(default = "default_soft_limit")]
    pub soft_limit: usize,
    /// Registrations between two prune passes while over the soft limit
    #[serde(default = "default_prune_interval")]
    pub prune_interval: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            soft_limit: REGISTRY_SOFT_LIMIT,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Fallback level when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_soft_limit() -> usize {
    REGISTRY_SOFT_LIMIT
}

fn default_prune_interval() -> usize {
    DEFAULT_PRUNE_INTERVAL
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file in the working directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MockError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            MockError::Config(format!(
                "Failed to parse TOML config from {:?}: {}",
                path, e
            ))
        })
    }

    /// Load default config if file is missing or unreadable
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                logging::log_config_fallback(&e);
                Config::default()
            }
        }
    }

    /// Install the tracing subscriber described by the `[logging]` table
    pub fn init_logging(&self) -> bool {
        logging::init(&self.logging.level, self.logging.json)
    }
}

impl RegistryConfig {
    /// Prune interval with `0` treated as `1`
    pub fn effective_prune_interval(&self) -> usize {
        self.prune_interval.max(1)
    }
}
