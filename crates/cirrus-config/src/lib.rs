pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV: &str = "CIRRUS_CONFIG_PATH";
const INTERVAL_ENV: &str = "CIRRUS_GCE_OPERATION_INTERVAL_MS";
const TIMEOUT_ENV: &str = "CIRRUS_GCE_OPERATION_TIMEOUT_MS";
const RANGE_ENV: &str = "CIRRUS_GCE_DEFAULT_NETWORK_RANGE";

/// Top-level Cirrus configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirrusConfig {
    #[serde(default)]
    pub gce: GceSettings,
}

/// Settings for the Compute Engine binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GceSettings {
    /// Delay between operation status checks (milliseconds)
    #[serde(default = "default_operation_interval")]
    pub operation_complete_interval_ms: u64,

    /// How long to wait for an operation before giving up (milliseconds)
    #[serde(default = "default_operation_timeout")]
    pub operation_complete_timeout_ms: u64,

    /// Address range of networks created for new security groups
    #[serde(default = "default_network_range")]
    pub default_network_range: String,
}

fn default_operation_interval() -> u64 {
    2000 // 2s
}
fn default_operation_timeout() -> u64 {
    600_000 // 10min
}
fn default_network_range() -> String {
    "10.0.0.0/8".to_string()
}

impl Default for GceSettings {
    fn default() -> Self {
        Self {
            operation_complete_interval_ms: default_operation_interval(),
            operation_complete_timeout_ms: default_operation_timeout(),
            default_network_range: default_network_range(),
        }
    }
}

impl CirrusConfig {
    /// Read a config file, then apply environment overrides
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: CirrusConfig = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the discovered config file, or defaults when there is none
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Ok(path) => Self::from_path(&path),
            Err(ConfigError::ConfigFileNotFound) => {
                tracing::debug!("No config file found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides()?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Override settings from `CIRRUS_GCE_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(ms) = env_millis(INTERVAL_ENV)? {
            self.gce.operation_complete_interval_ms = ms;
        }
        if let Some(ms) = env_millis(TIMEOUT_ENV)? {
            self.gce.operation_complete_timeout_ms = ms;
        }
        if let Ok(range) = std::env::var(RANGE_ENV) {
            self.gce.default_network_range = range;
        }
        Ok(())
    }
}

fn env_millis(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Cirrus configuration directory (`~/.config/cirrus`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("cirrus");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Locate the Cirrus config file
///
/// Search order:
/// 1. `CIRRUS_CONFIG_PATH` environment variable
/// 2. current directory: cirrus.local.yaml, cirrus.yaml
/// 3. ~/.config/cirrus/cirrus.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["cirrus.local.yaml", "cirrus.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("cirrus").join("cirrus.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
