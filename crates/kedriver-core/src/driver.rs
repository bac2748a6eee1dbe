//! Cluster driver trait definitions
//!
//! This module defines the interface the orchestration layer uses to drive a
//! managed Kubernetes cluster through its lifecycle on some provider.

use crate::error::{Error, Result};
use crate::options::DriverOptions;
use crate::types::{Capabilities, ClusterInfo, KubernetesVersion, NodeCount};
use async_trait::async_trait;

/// Trait for managed Kubernetes cluster drivers
///
/// # Example
///
/// ```ignore
/// use kedriver_core::{ClusterDriver, DriverOptions};
///
/// let options = DriverOptions::new()
///     .with_string("name", "c1")
///     .with_string("project-id", "p1")
///     .with_string("zone", "us-central1-a")
///     .with_int("node-count", 3);
///
/// let mut info = driver.create(&options).await?;
/// driver.post_check(&mut info).await?;
/// println!("API server at {}", info.endpoint);
/// ```
#[async_trait]
pub trait ClusterDriver: Send + Sync {
    /// Get the driver name
    fn name(&self) -> &'static str;

    /// Optional operations this driver implements
    fn capabilities(&self) -> Capabilities;

    /// Create a cluster and return a record carrying the driver's state
    async fn create(&self, options: &DriverOptions) -> Result<ClusterInfo>;

    /// Apply new options to an existing cluster
    ///
    /// The record is updated after every completed step, so when a later step
    /// fails it still reflects what was actually applied.
    async fn update(&self, info: &mut ClusterInfo, options: &DriverOptions) -> Result<()>;

    /// Wait for the cluster to settle and fill in its connection details
    async fn post_check(&self, info: &mut ClusterInfo) -> Result<()>;

    /// Delete the cluster; deleting an already-absent cluster succeeds
    async fn remove(&self, info: &ClusterInfo) -> Result<()>;

    /// Current node count
    async fn get_cluster_size(&self, _info: &ClusterInfo) -> Result<NodeCount> {
        Err(Error::unsupported("get-cluster-size"))
    }

    /// Resize the cluster
    async fn set_cluster_size(&self, _info: &ClusterInfo, _count: NodeCount) -> Result<()> {
        Err(Error::unsupported("set-cluster-size"))
    }

    /// Current control-plane version
    async fn get_version(&self, _info: &ClusterInfo) -> Result<KubernetesVersion> {
        Err(Error::unsupported("get-version"))
    }

    /// Upgrade the control plane and then the nodes
    async fn set_version(&self, _info: &ClusterInfo, _version: &KubernetesVersion) -> Result<()> {
        Err(Error::unsupported("set-version"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe
    fn _assert_object_safe(_: &dyn ClusterDriver) {}

    struct Minimal;

    #[async_trait]
    impl ClusterDriver for Minimal {
        fn name(&self) -> &'static str {
            "minimal"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        async fn create(&self, _options: &DriverOptions) -> Result<ClusterInfo> {
            Ok(ClusterInfo::new())
        }

        async fn update(&self, _info: &mut ClusterInfo, _options: &DriverOptions) -> Result<()> {
            Ok(())
        }

        async fn post_check(&self, _info: &mut ClusterInfo) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _info: &ClusterInfo) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_optional_operations_default_to_unsupported() {
        let driver = Minimal;
        let info = ClusterInfo::new();

        let err = driver.get_cluster_size(&info).await.unwrap_err();
        assert!(matches!(err, Error::Unsupported { ref operation } if operation == "get-cluster-size"));

        let err = driver
            .set_version(&info, &KubernetesVersion::new("1.30"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }
}
