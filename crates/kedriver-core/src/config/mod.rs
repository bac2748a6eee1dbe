//! Runtime configuration for drivers
//!
//! Loaded with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Config file (`~/.kedriver/config.yaml` or an explicit path)
//! 3. Environment variables (`KEDRIVER_*` prefix)

mod loader;

pub use loader::ConfigLoader;

use crate::wait::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default provider API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://container.googleapis.com/v1/";

/// Default OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Top-level driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DriverConfig {
    /// Status wait settings
    #[serde(default)]
    pub wait: WaitConfig,

    /// Provider API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Status wait settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WaitConfig {
    /// Seconds between status polls
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound on a single wait in seconds (0 = no deadline)
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Upper bound on polls per wait (0 = unlimited)
    #[serde(default)]
    pub max_polls: u32,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_max_wait_secs() -> u64 {
    3600
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
            max_polls: 0,
        }
    }
}

impl WaitConfig {
    /// Convert to the policy consumed by the wait engine
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(self.interval_secs),
            max_wait: (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs)),
            max_polls: (self.max_polls > 0).then_some(self.max_polls),
        }
    }
}

/// Provider API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Base URL of the cluster API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout applied to every individual API request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Token endpoint used when a credential file does not name one
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            token_uri: default_token_uri(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.wait.interval_secs, 5);
        assert_eq!(config.wait.max_wait_secs, 3600);
        assert_eq!(config.api.endpoint, DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn test_wait_policy_conversion() {
        let policy = WaitConfig::default().policy();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_wait, Some(Duration::from_secs(3600)));
        assert_eq!(policy.max_polls, None);

        let unbounded = WaitConfig {
            interval_secs: 10,
            max_wait_secs: 0,
            max_polls: 12,
        }
        .policy();
        assert_eq!(unbounded.max_wait, None);
        assert_eq!(unbounded.max_polls, Some(12));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "wait:\n  interval-secs: 2\napi:\n  endpoint: http://localhost:8080/v1/\n";
        let config: DriverConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.wait.interval_secs, 2);
        assert_eq!(config.wait.max_wait_secs, 3600);
        assert_eq!(config.api.endpoint, "http://localhost:8080/v1/");
        assert_eq!(config.api.request_timeout_secs, 60);
    }
}
