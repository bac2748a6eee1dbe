//! Container API access
//!
//! [`ContainerApi`] is the seam between lifecycle operations and the provider.
//! [`HttpContainerClient`] implements it over the zonal v1 REST routes; tests
//! substitute scripted fakes.

mod http;
mod types;

pub use http::HttpContainerClient;
pub use types::*;

use crate::credentials::CredentialsError;
use async_trait::async_trait;
use std::fmt;

/// Result type for container API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Compound identity of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterRef {
    pub project_id: String,
    pub zone: String,
    pub cluster: String,
}

impl ClusterRef {
    pub fn new(
        project_id: impl Into<String>,
        zone: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            zone: zone.into(),
            cluster: cluster.into(),
        }
    }
}

impl fmt::Display for ClusterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/zones/{}/clusters/{}",
            self.project_id, self.zone, self.cluster
        )
    }
}

/// Errors returned by the container API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The provider answered with a non-success status
    #[error("googleapi: Error {status}: {message}{}", reason_suffix(.reason))]
    Status {
        status: u16,
        /// Machine-readable reason such as `notFound` or `alreadyExists`
        reason: String,
        message: String,
    },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// No access token could be obtained
    #[error("authentication failed: {0}")]
    Auth(#[from] CredentialsError),

    /// The response body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(", {}", reason)
    }
}

impl ApiError {
    /// Create a status error
    pub fn status(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// HTTP status of a provider answer, if one was received
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, reason, .. } if *status == 404 || reason == "notFound")
    }

    /// The resource being created already exists
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Status { status, reason, .. } if *status == 409 || reason == "alreadyExists")
    }
}

/// Operations on clusters and node pools
#[async_trait]
pub trait ContainerApi: Send + Sync {
    /// Start creating a cluster in the given project and zone
    async fn create_cluster(
        &self,
        project_id: &str,
        zone: &str,
        request: &CreateClusterRequest,
    ) -> ApiResult<Operation>;

    async fn get_cluster(&self, cluster: &ClusterRef) -> ApiResult<Cluster>;

    async fn update_cluster(
        &self,
        cluster: &ClusterRef,
        request: &UpdateClusterRequest,
    ) -> ApiResult<Operation>;

    async fn delete_cluster(&self, cluster: &ClusterRef) -> ApiResult<Operation>;

    async fn get_node_pool(&self, cluster: &ClusterRef, node_pool: &str) -> ApiResult<NodePool>;

    async fn update_node_pool(
        &self,
        cluster: &ClusterRef,
        node_pool: &str,
        request: &UpdateNodePoolRequest,
    ) -> ApiResult<Operation>;

    async fn set_node_pool_size(
        &self,
        cluster: &ClusterRef,
        node_pool: &str,
        request: &SetNodePoolSizeRequest,
    ) -> ApiResult<Operation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_ref_display() {
        let cluster = ClusterRef::new("p1", "us-central1-a", "c1");
        assert_eq!(
            cluster.to_string(),
            "projects/p1/zones/us-central1-a/clusters/c1"
        );
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ApiError::status(404, "", "gone").is_not_found());
        assert!(ApiError::status(400, "notFound", "gone").is_not_found());
        assert!(!ApiError::status(403, "forbidden", "no").is_not_found());
    }

    #[test]
    fn test_already_exists_detection() {
        assert!(ApiError::status(409, "", "dup").is_already_exists());
        assert!(ApiError::status(400, "alreadyExists", "dup").is_already_exists());
        assert!(!ApiError::status(404, "notFound", "gone").is_already_exists());
    }

    #[test]
    fn test_status_display_includes_reason() {
        let err = ApiError::status(404, "notFound", "Not found: cluster c1.");
        assert_eq!(
            err.to_string(),
            "googleapi: Error 404: Not found: cluster c1., notFound"
        );
    }
}
