//! GKE cluster driver

use crate::api::{
    Cluster, ClusterRef, ContainerApi, SetNodePoolSizeRequest, UpdateClusterRequest,
    UpdateNodePoolRequest,
};
use crate::credentials::{ClientFactory, CredentialSource, HttpClientFactory};
use crate::request;
use crate::state::{ClusterState, NODE_POOL_KEY};
use crate::wait::{wait_cluster, wait_node_pool};
use async_trait::async_trait;
use kedriver_core::error::BoxError;
use kedriver_core::wait::{StatusPoller, TracingObserver};
use kedriver_core::{
    Capabilities, Capability, ClusterDriver, ClusterInfo, DriverConfig, DriverOptions, Error,
    KubernetesVersion, NodeCount, Result,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Mints a token for the orchestration layer's service account inside a new cluster
#[async_trait]
pub trait ServiceAccountTokenMinter: Send + Sync {
    async fn mint(&self, cluster: &Cluster) -> std::result::Result<String, BoxError>;
}

/// Driver for Google Kubernetes Engine clusters
pub struct GkeDriver {
    clients: Arc<dyn ClientFactory>,
    poller: StatusPoller,
    minter: Option<Arc<dyn ServiceAccountTokenMinter>>,
}

impl GkeDriver {
    /// Create a driver that obtains API clients from `clients`
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            poller: StatusPoller::default().with_observer(TracingObserver::new()),
            minter: None,
        }
    }

    /// Create a driver talking to the real API with the given configuration
    pub fn from_config(config: &DriverConfig, cancel: CancellationToken) -> Result<Self> {
        let clients = HttpClientFactory::new(&config.api)?;
        let poller = StatusPoller::new(config.wait.policy())
            .with_observer(TracingObserver::new())
            .with_cancellation(cancel);
        Ok(Self::new(Arc::new(clients)).with_poller(poller))
    }

    pub fn with_poller(mut self, poller: StatusPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_token_minter(mut self, minter: Arc<dyn ServiceAccountTokenMinter>) -> Self {
        self.minter = Some(minter);
        self
    }

    async fn client(&self, state: &ClusterState) -> Result<Arc<dyn ContainerApi>> {
        self.clients
            .connect(&CredentialSource::from_state(state))
            .await
    }

    async fn get_cluster(api: &dyn ContainerApi, cluster: &ClusterRef) -> Result<Cluster> {
        api.get_cluster(cluster)
            .await
            .map_err(|e| Error::provider("error getting cluster info", e))
    }

    /// Name of the first node pool, which this driver resizes and upgrades
    fn first_node_pool(cluster: &Cluster) -> Result<String> {
        cluster
            .first_node_pool()
            .map(|pool| pool.name.clone())
            .ok_or_else(|| no_node_pools(cluster))
    }

    async fn update_master_and_wait(
        &self,
        api: &dyn ContainerApi,
        cluster: &ClusterRef,
        version: &str,
    ) -> Result<()> {
        info!("Updating master to {}", version);
        let operation = api
            .update_cluster(cluster, &UpdateClusterRequest::master_version(version))
            .await
            .map_err(|e| Error::provider("error while updating cluster", e))?;
        debug!(
            "Cluster {} update is called for project {} and zone {}. Operation {}",
            cluster.cluster, cluster.project_id, cluster.zone, operation.name
        );
        wait_cluster(api, &self.poller, cluster).await
    }

    async fn resize_and_wait(
        &self,
        api: &dyn ContainerApi,
        cluster: &ClusterRef,
        node_pool: &str,
        count: i64,
    ) -> Result<()> {
        info!("Updating node number to {}", count);
        let operation = api
            .set_node_pool_size(cluster, node_pool, &SetNodePoolSizeRequest { node_count: count })
            .await
            .map_err(|e| Error::provider("error while resizing node pool", e))?;
        debug!(
            "Nodepool {} setSize is called for cluster {}. Operation {}",
            node_pool, cluster, operation.name
        );
        wait_cluster(api, &self.poller, cluster).await
    }
}

fn no_node_pools(cluster: &Cluster) -> Error {
    Error::unexpected_response(format!("cluster {} has no node pools", cluster.name))
}

#[async_trait]
impl ClusterDriver for GkeDriver {
    fn name(&self) -> &'static str {
        "gke"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with(Capability::GetVersion)
            .with(Capability::SetVersion)
            .with(Capability::GetClusterSize)
            .with(Capability::SetClusterSize)
    }

    async fn create(&self, options: &DriverOptions) -> Result<ClusterInfo> {
        let state = ClusterState::decode(options)?;
        let api = self.client(&state).await?;
        let cluster = state.cluster_ref();

        match api
            .create_cluster(&state.project_id, &state.zone, &request::build(&state))
            .await
        {
            Ok(operation) => debug!(
                "Cluster {} create is called for project {} and zone {}. Operation {}",
                state.name, state.project_id, state.zone, operation.name
            ),
            Err(e) if e.is_already_exists() => {
                warn!("Cluster {} already exists, waiting for it", state.name)
            }
            Err(e) => return Err(Error::provider("error creating cluster", e)),
        }

        wait_cluster(api.as_ref(), &self.poller, &cluster).await?;

        let mut info = ClusterInfo::new();
        state.store(&mut info)?;
        Ok(info)
    }

    async fn update(&self, info: &mut ClusterInfo, options: &DriverOptions) -> Result<()> {
        let mut state = ClusterState::restore(info)?;
        let mut requested = ClusterState::from_options(options);
        requested.inherit_from(&state);
        requested.validate()?;

        let api = self.client(&requested).await?;
        let cluster = state.cluster_ref();

        if state.node_pool_id.is_empty() {
            let live = Self::get_cluster(api.as_ref(), &cluster).await?;
            state.node_pool_id = Self::first_node_pool(&live)?;
        }

        debug!(
            "Updating config. MasterVersion: {}, NodeVersion: {}, NodeCount: {}",
            requested.master_version, requested.node_version, requested.node_count
        );

        if !requested.master_version.is_empty() {
            self.update_master_and_wait(api.as_ref(), &cluster, &requested.master_version)
                .await?;
            state.master_version = requested.master_version.clone();
            state.store(info)?;
        }

        if !requested.node_version.is_empty() {
            info!("Updating node version to {}", requested.node_version);
            let operation = api
                .update_node_pool(
                    &cluster,
                    &state.node_pool_id,
                    &UpdateNodePoolRequest {
                        node_version: requested.node_version.clone(),
                        image_type: state.node_config.image_type.clone(),
                    },
                )
                .await
                .map_err(|e| Error::provider("error while updating node pool", e))?;
            debug!(
                "Nodepool {} update is called for cluster {}. Operation {}",
                state.node_pool_id, cluster, operation.name
            );
            wait_node_pool(api.as_ref(), &self.poller, &cluster, &state.node_pool_id).await?;
            state.node_version = requested.node_version.clone();
            state.store(info)?;
        }

        if requested.node_count != 0 {
            self.resize_and_wait(
                api.as_ref(),
                &cluster,
                &state.node_pool_id,
                requested.node_count,
            )
            .await?;
            state.node_count = requested.node_count;
        }

        state.store(info)
    }

    async fn post_check(&self, info: &mut ClusterInfo) -> Result<()> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;
        let cluster_ref = state.cluster_ref();

        wait_cluster(api.as_ref(), &self.poller, &cluster_ref).await?;
        let cluster = Self::get_cluster(api.as_ref(), &cluster_ref).await?;

        info.endpoint = cluster.endpoint.clone();
        info.version = cluster.current_master_version.clone();
        info.node_count = cluster.current_node_count;
        info.status = cluster.status.clone();
        if let Some(auth) = &cluster.master_auth {
            info.username = auth.username.clone();
            info.password = auth.password.clone();
            info.root_ca_certificate = auth.cluster_ca_certificate.clone();
            info.client_certificate = auth.client_certificate.clone();
            info.client_key = auth.client_key.clone();
        }
        info.set_metadata(NODE_POOL_KEY, Self::first_node_pool(&cluster)?);

        if let Some(minter) = &self.minter {
            info.service_account_token = minter
                .mint(&cluster)
                .await
                .map_err(|e| Error::provider("error generating service account token", e))?;
        }

        Ok(())
    }

    async fn remove(&self, info: &ClusterInfo) -> Result<()> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;

        debug!(
            "Removing cluster {} from project {}, zone {}",
            state.name, state.project_id, state.zone
        );
        match api.delete_cluster(&state.cluster_ref()).await {
            Ok(operation) => {
                debug!("Cluster {} delete is called. Operation {}", state.name, operation.name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("Cluster {} doesn't exist", state.name);
                Ok(())
            }
            Err(e) => Err(Error::provider("error deleting cluster", e)),
        }
    }

    async fn get_cluster_size(&self, info: &ClusterInfo) -> Result<NodeCount> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;
        let cluster = Self::get_cluster(api.as_ref(), &state.cluster_ref()).await?;

        let pool = cluster
            .first_node_pool()
            .ok_or_else(|| no_node_pools(&cluster))?;
        Ok(NodeCount::new(pool.initial_node_count))
    }

    async fn set_cluster_size(&self, info: &ClusterInfo, count: NodeCount) -> Result<()> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;
        let cluster_ref = state.cluster_ref();
        let cluster = Self::get_cluster(api.as_ref(), &cluster_ref).await?;
        let node_pool = Self::first_node_pool(&cluster)?;

        info!("updating cluster size");
        self.resize_and_wait(api.as_ref(), &cluster_ref, &node_pool, count.count)
            .await?;
        info!("cluster size updated successfully");
        Ok(())
    }

    async fn get_version(&self, info: &ClusterInfo) -> Result<KubernetesVersion> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;
        let cluster = Self::get_cluster(api.as_ref(), &state.cluster_ref()).await?;
        Ok(KubernetesVersion::new(cluster.current_master_version))
    }

    async fn set_version(&self, info: &ClusterInfo, version: &KubernetesVersion) -> Result<()> {
        let state = ClusterState::restore(info)?;
        let api = self.client(&state).await?;
        let cluster = state.cluster_ref();

        self.update_master_and_wait(api.as_ref(), &cluster, &version.version)
            .await?;
        info!("master version updated successfully");

        info!("Updating node version to {}", version.version);
        api.update_cluster(&cluster, &UpdateClusterRequest::node_version(&version.version))
            .await
            .map_err(|e| Error::provider("error while updating cluster", e))?;
        wait_cluster(api.as_ref(), &self.poller, &cluster).await?;
        info!("node version updated successfully");
        Ok(())
    }
}
