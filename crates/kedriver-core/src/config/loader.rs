//! Configuration file loading with environment overrides

use super::DriverConfig;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Default configuration file name inside the config directory
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Loads [`DriverConfig`] from defaults, a YAML file and the environment
pub struct ConfigLoader {
    /// Directory searched when no explicit path is given
    config_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.kedriver)
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|_| Error::invalid_config("Home directory is not valid UTF-8"))?;

        Ok(Self {
            config_dir: home.join(".kedriver"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default file is used
    /// when present and built-in defaults otherwise.
    pub fn load(&self, path: Option<&Utf8Path>) -> Result<DriverConfig> {
        let config = match path {
            Some(p) => Self::load_yaml_file(p)?,
            None => {
                let default_path = self.config_dir.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load_yaml_file(&default_path)?
                } else {
                    debug!("No config file at {}, using defaults", default_path);
                    DriverConfig::default()
                }
            }
        };

        let config = Self::apply_env_overrides(config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &DriverConfig) -> Result<()> {
        if config.wait.interval_secs == 0 {
            return Err(Error::invalid_config(
                "wait.interval-secs must be at least 1 second",
            ));
        }
        Ok(())
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<DriverConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        debug!("Loading driver config from {}", path);
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: DriverConfig) -> Result<DriverConfig> {
        if let Ok(val) = env::var("KEDRIVER_API_ENDPOINT") {
            config.api.endpoint = val;
        }

        if let Ok(val) = env::var("KEDRIVER_TOKEN_URI") {
            config.api.token_uri = val;
        }

        if let Ok(val) = env::var("KEDRIVER_REQUEST_TIMEOUT_SECS") {
            config.api.request_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEDRIVER_REQUEST_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("KEDRIVER_POLL_INTERVAL_SECS") {
            config.wait.interval_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEDRIVER_POLL_INTERVAL_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("KEDRIVER_MAX_WAIT_SECS") {
            config.wait.max_wait_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEDRIVER_MAX_WAIT_SECS must be a valid number")
            })?;
        }

        Ok(config)
    }
}
