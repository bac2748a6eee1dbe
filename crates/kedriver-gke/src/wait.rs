//! Waits for clusters and node pools to reach RUNNING

use crate::api::{ApiError, ClusterRef, ContainerApi};
use kedriver_core::wait::{StatusPoller, WaitError, RUNNING_STATUS};
use kedriver_core::{Error, Result};

/// Poll the cluster until it is RUNNING
pub async fn wait_cluster(
    api: &dyn ContainerApi,
    poller: &StatusPoller,
    cluster: &ClusterRef,
) -> Result<()> {
    let resource = format!("cluster {}", cluster.cluster);
    let outcome = poller
        .wait_for(&resource, RUNNING_STATUS, || async move {
            api.get_cluster(cluster).await.map(|c| c.status)
        })
        .await;
    outcome.map_err(|err| into_error(resource, err))
}

/// Poll a node pool of the cluster until it is RUNNING
pub async fn wait_node_pool(
    api: &dyn ContainerApi,
    poller: &StatusPoller,
    cluster: &ClusterRef,
    node_pool: &str,
) -> Result<()> {
    let resource = format!("nodepool {}", node_pool);
    let outcome = poller
        .wait_for(&resource, RUNNING_STATUS, || async move {
            api.get_node_pool(cluster, node_pool)
                .await
                .map(|pool| pool.status)
        })
        .await;
    outcome.map_err(|err| into_error(resource, err))
}

fn into_error(resource: String, err: WaitError<ApiError>) -> Error {
    match err {
        WaitError::Fetch { source, .. } => {
            Error::provider(format!("error polling {}", resource), source)
        }
        WaitError::TimedOut {
            elapsed,
            last_status,
            ..
        } => Error::WaitTimedOut {
            resource,
            last_status: last_status.unwrap_or_default(),
            elapsed,
        },
        WaitError::Cancelled { .. } => Error::WaitCancelled { resource },
    }
}
