//! The cluster-info record owned by the orchestration layer
//!
//! Drivers never persist this record themselves. They read their opaque
//! state out of [`ClusterInfo::metadata`] and write display fields back for
//! the caller to store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted handle to a cluster, as seen by the orchestration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterInfo {
    /// Kubernetes version reported by the control plane
    pub version: String,

    /// API server endpoint (host or URL)
    pub endpoint: String,

    /// Basic-auth username for the API server
    pub username: String,

    /// Basic-auth password for the API server
    pub password: String,

    /// Base64-encoded cluster CA certificate
    pub root_ca_certificate: String,

    /// Base64-encoded client certificate
    pub client_certificate: String,

    /// Base64-encoded client key
    pub client_key: String,

    /// Current number of nodes
    pub node_count: i64,

    /// Token for the orchestration layer's service account inside the cluster
    pub service_account_token: String,

    /// Last known provider status
    pub status: String,

    /// Free-form driver metadata
    pub metadata: HashMap<String, String>,
}

impl ClusterInfo {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a metadata value, treating empty strings as absent
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Set a metadata value
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// Node count as exchanged with the orchestration layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCount {
    pub count: i64,
}

impl NodeCount {
    pub fn new(count: i64) -> Self {
        Self { count }
    }
}

/// Kubernetes version as exchanged with the orchestration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesVersion {
    pub version: String,
}

impl KubernetesVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}
