//! Error types for kedriver-core

use std::time::Duration;
use thiserror::Error;

/// Result type alias using kedriver-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error coming from a provider SDK or HTTP client
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error types for kedriver
#[derive(Error, Debug)]
pub enum Error {
    /// A required option is missing or malformed
    #[error("{message}")]
    Validation { message: String },

    /// The cluster-info record carries no persisted driver state
    #[error("Cluster info carries no driver state (metadata key '{key}' is empty)")]
    MissingState { key: String },

    /// The persisted driver state could not be decoded
    #[error("Persisted driver state is corrupt: {source}")]
    StateCorrupt {
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The provider API rejected or failed a call
    #[error("{context}: {source}")]
    Provider {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The provider returned a resource missing data the driver relies on
    #[error("Unexpected provider response: {message}")]
    UnexpectedResponse { message: String },

    /// Credentials could not be loaded or exchanged for a token
    #[error("Credential error: {message}")]
    Credentials { message: String },

    /// A status wait ran past its deadline or poll budget
    #[error("Timed out after {:.0}s waiting for {resource} (last status: {last_status})", .elapsed.as_secs_f64())]
    WaitTimedOut {
        resource: String,
        last_status: String,
        elapsed: Duration,
    },

    /// A status wait was cancelled by the caller
    #[error("Wait for {resource} was cancelled")]
    WaitCancelled { resource: String },

    /// The driver does not implement the requested operation
    #[error("Operation not supported by this driver: {operation}")]
    Unsupported { operation: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing state error for the given metadata key
    pub fn missing_state(key: impl Into<String>) -> Self {
        Self::MissingState { key: key.into() }
    }

    /// Wrap a provider error with a short description of the failed call
    pub fn provider<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Provider {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Create a credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for errors raised before any network call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True when a wait ended without reaching its terminal status
    pub fn is_wait_interrupted(&self) -> bool {
        matches!(self, Self::WaitTimedOut { .. } | Self::WaitCancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = Error::validation("project ID is required");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "project ID is required");
    }

    #[test]
    fn test_provider_error_keeps_prefix_and_source() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "403 Forbidden");
        let err = Error::provider("error getting cluster info", source);
        assert_eq!(err.to_string(), "error getting cluster info: 403 Forbidden");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_wait_errors_are_interruptions() {
        let timed_out = Error::WaitTimedOut {
            resource: "cluster c1".into(),
            last_status: "PROVISIONING".into(),
            elapsed: Duration::from_secs(3600),
        };
        assert!(timed_out.is_wait_interrupted());
        assert!(timed_out.to_string().contains("PROVISIONING"));

        let cancelled = Error::WaitCancelled {
            resource: "cluster c1".into(),
        };
        assert!(cancelled.is_wait_interrupted());
        assert!(!Error::missing_state("state").is_wait_interrupted());
    }
}
