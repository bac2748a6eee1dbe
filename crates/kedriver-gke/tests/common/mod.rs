//! Common test helpers for kedriver-gke integration tests
//!
//! Provides a scripted in-memory container API and a client factory that
//! records which credential sources were requested.

use async_trait::async_trait;
use kedriver_core::wait::{RecordingObserver, StatusPoller, WaitPolicy};
use kedriver_core::{ClusterInfo, DriverOptions};
use kedriver_gke::api::{
    ApiError, ApiResult, Cluster, ClusterRef, ContainerApi, CreateClusterRequest, MasterAuth,
    NodePool, Operation, SetNodePoolSizeRequest, UpdateClusterRequest, UpdateNodePoolRequest,
};
use kedriver_gke::{ClientFactory, ClusterState, CredentialSource, GkeDriver};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded call against the fake API
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    CreateCluster {
        project_id: String,
        zone: String,
        request: Box<CreateClusterRequest>,
    },
    GetCluster(String),
    UpdateCluster(UpdateClusterRequest),
    DeleteCluster(String),
    GetNodePool(String),
    UpdateNodePool {
        node_pool: String,
        request: UpdateNodePoolRequest,
    },
    SetNodePoolSize {
        node_pool: String,
        node_count: i64,
    },
}

impl Call {
    /// Short name used when asserting call order
    pub fn kind(&self) -> &'static str {
        match self {
            Call::CreateCluster { .. } => "create_cluster",
            Call::GetCluster(_) => "get_cluster",
            Call::UpdateCluster(_) => "update_cluster",
            Call::DeleteCluster(_) => "delete_cluster",
            Call::GetNodePool(_) => "get_node_pool",
            Call::UpdateNodePool { .. } => "update_node_pool",
            Call::SetNodePoolSize { .. } => "set_node_pool_size",
        }
    }
}

/// Pops scripted statuses, repeating the last one; RUNNING when nothing is scripted
#[derive(Debug, Default)]
struct StatusScript(Mutex<VecDeque<String>>);

impl StatusScript {
    fn set(&self, statuses: &[&str]) {
        *self.0.lock().unwrap() = statuses.iter().map(|s| s.to_string()).collect();
    }

    fn next(&self) -> String {
        let mut statuses = self.0.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| "RUNNING".to_string())
        }
    }
}

/// In-memory container API with scripted statuses and failures
#[derive(Debug, Default)]
pub struct FakeContainerApi {
    calls: Mutex<Vec<Call>>,
    cluster: Mutex<Cluster>,
    cluster_statuses: StatusScript,
    node_pool_statuses: StatusScript,
    failures: Mutex<HashMap<&'static str, (u16, &'static str)>>,
}

#[allow(dead_code)]
impl FakeContainerApi {
    /// A fake whose cluster has one node pool and master auth material
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        *fake.cluster.lock().unwrap() = sample_cluster();
        Arc::new(fake)
    }

    /// Script the statuses returned by successive `get_cluster` calls
    pub fn with_cluster_statuses(self: Arc<Self>, statuses: &[&str]) -> Arc<Self> {
        self.cluster_statuses.set(statuses);
        self
    }

    /// Script the statuses returned by successive `get_node_pool` calls
    pub fn with_node_pool_statuses(self: Arc<Self>, statuses: &[&str]) -> Arc<Self> {
        self.node_pool_statuses.set(statuses);
        self
    }

    /// Make every call of `method` fail with the given status and reason
    pub fn fail_on(self: Arc<Self>, method: &'static str, status: u16, reason: &'static str) -> Arc<Self> {
        self.failures
            .lock()
            .unwrap()
            .insert(method, (status, reason));
        self
    }

    /// Replace the cluster returned by `get_cluster`
    pub fn with_cluster(self: Arc<Self>, cluster: Cluster) -> Arc<Self> {
        *self.cluster.lock().unwrap() = cluster;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Call kinds in order, skipping status polls
    pub fn mutations(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(Call::kind)
            .filter(|kind| !kind.starts_with("get_"))
            .collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|call| call.kind() == kind).count()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(kind) {
            Some((status, reason)) => Err(ApiError::status(
                *status,
                *reason,
                format!("{} failed", kind),
            )),
            None => Ok(()),
        }
    }

    fn operation(kind: &str) -> Operation {
        Operation {
            name: format!("operation-{}", kind),
            status: "RUNNING".into(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContainerApi for FakeContainerApi {
    async fn create_cluster(
        &self,
        project_id: &str,
        zone: &str,
        request: &CreateClusterRequest,
    ) -> ApiResult<Operation> {
        self.record(Call::CreateCluster {
            project_id: project_id.to_string(),
            zone: zone.to_string(),
            request: Box::new(request.clone()),
        })?;
        Ok(Self::operation("create"))
    }

    async fn get_cluster(&self, cluster: &ClusterRef) -> ApiResult<Cluster> {
        self.record(Call::GetCluster(cluster.to_string()))?;
        let mut current = self.cluster.lock().unwrap().clone();
        current.status = self.cluster_statuses.next();
        Ok(current)
    }

    async fn update_cluster(
        &self,
        _cluster: &ClusterRef,
        request: &UpdateClusterRequest,
    ) -> ApiResult<Operation> {
        self.record(Call::UpdateCluster(request.clone()))?;
        Ok(Self::operation("update"))
    }

    async fn delete_cluster(&self, cluster: &ClusterRef) -> ApiResult<Operation> {
        self.record(Call::DeleteCluster(cluster.to_string()))?;
        Ok(Self::operation("delete"))
    }

    async fn get_node_pool(&self, _cluster: &ClusterRef, node_pool: &str) -> ApiResult<NodePool> {
        self.record(Call::GetNodePool(node_pool.to_string()))?;
        Ok(NodePool {
            name: node_pool.to_string(),
            status: self.node_pool_statuses.next(),
            ..Default::default()
        })
    }

    async fn update_node_pool(
        &self,
        _cluster: &ClusterRef,
        node_pool: &str,
        request: &UpdateNodePoolRequest,
    ) -> ApiResult<Operation> {
        self.record(Call::UpdateNodePool {
            node_pool: node_pool.to_string(),
            request: request.clone(),
        })?;
        Ok(Self::operation("update-node-pool"))
    }

    async fn set_node_pool_size(
        &self,
        _cluster: &ClusterRef,
        node_pool: &str,
        request: &SetNodePoolSizeRequest,
    ) -> ApiResult<Operation> {
        self.record(Call::SetNodePoolSize {
            node_pool: node_pool.to_string(),
            node_count: request.node_count,
        })?;
        Ok(Self::operation("set-size"))
    }
}

/// Client factory handing out one shared fake and recording requested sources
#[derive(Default)]
pub struct FakeClientFactory {
    api: Arc<FakeContainerApi>,
    sources: Mutex<Vec<CredentialSource>>,
}

#[allow(dead_code)]
impl FakeClientFactory {
    pub fn new(api: Arc<FakeContainerApi>) -> Arc<Self> {
        Arc::new(Self {
            api,
            sources: Mutex::new(Vec::new()),
        })
    }

    pub fn sources(&self) -> Vec<CredentialSource> {
        self.sources.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    async fn connect(
        &self,
        source: &CredentialSource,
    ) -> kedriver_core::Result<Arc<dyn ContainerApi>> {
        self.sources.lock().unwrap().push(source.clone());
        let api: Arc<dyn ContainerApi> = self.api.clone();
        Ok(api)
    }
}

/// Everything a driver test needs
#[allow(dead_code)]
pub struct Harness {
    pub driver: GkeDriver,
    pub api: Arc<FakeContainerApi>,
    pub factory: Arc<FakeClientFactory>,
    pub observer: RecordingObserver,
}

/// Build a driver over `api` with a 5s poll interval and no deadline
#[allow(dead_code)]
pub fn harness(api: Arc<FakeContainerApi>) -> Harness {
    harness_with_poller(api, StatusPoller::new(WaitPolicy::unbounded(Duration::from_secs(5))))
}

/// Build a driver over `api` using the given poller (its observer is replaced)
#[allow(dead_code)]
pub fn harness_with_poller(api: Arc<FakeContainerApi>, poller: StatusPoller) -> Harness {
    let factory = FakeClientFactory::new(api.clone());
    let observer = RecordingObserver::new();
    let driver = GkeDriver::new(factory.clone()).with_poller(poller.with_observer(observer.clone()));
    Harness {
        driver,
        api,
        factory,
        observer,
    }
}

/// The cluster every fake starts with
pub fn sample_cluster() -> Cluster {
    Cluster {
        name: "c1".into(),
        zone: "z1".into(),
        endpoint: "35.1.2.3".into(),
        current_master_version: "1.29.1-gke.1".into(),
        current_node_count: 3,
        status: "RUNNING".into(),
        master_auth: Some(MasterAuth {
            username: "admin".into(),
            password: "generated".into(),
            cluster_ca_certificate: "Y2EtY2VydA==".into(),
            client_certificate: "Y2xpZW50LWNlcnQ=".into(),
            client_key: "Y2xpZW50LWtleQ==".into(),
        }),
        node_pools: vec![NodePool {
            name: "default-pool".into(),
            initial_node_count: 3,
            status: "RUNNING".into(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Options naming cluster c1 in project p1, zone z1
#[allow(dead_code)]
pub fn base_options() -> DriverOptions {
    DriverOptions::new()
        .with_string("name", "c1")
        .with_string("project-id", "p1")
        .with_string("zone", "z1")
}

/// A cluster-info record carrying the state decoded from `options`
#[allow(dead_code)]
pub fn stored_info(options: &DriverOptions) -> ClusterInfo {
    let state = ClusterState::decode(options).unwrap();
    let mut info = ClusterInfo::new();
    state.store(&mut info).unwrap();
    info
}
