//! Wire types of the container API (v1)
//!
//! Only the fields this driver reads or writes are modelled. Empty strings,
//! zero counts and empty collections are left out of request bodies so the
//! provider applies its own defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_zero(n: &i64) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A cluster resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub initial_node_count: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub initial_cluster_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_config: Option<NodeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_auth: Option<MasterAuth>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub logging_service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub monitoring_service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subnetwork: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_ipv4_cidr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_allocation_policy: Option<IpAllocationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addons_config: Option<AddonsConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_kubernetes_alpha: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_abac: Option<LegacyAbac>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_policy: Option<MaintenancePolicy>,

    // Output only
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub current_master_version: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub current_node_count: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status_message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_pools: Vec<NodePool>,
}

impl Cluster {
    /// The first node pool, which this driver manages
    pub fn first_node_pool(&self) -> Option<&NodePool> {
        self.node_pools.first()
    }
}

/// A node pool resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePool {
    pub name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub initial_node_count: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status_message: String,
}

/// Machine settings for the nodes of a pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub machine_type: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub disk_size_gb: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub disk_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Control-plane authentication material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterAuth {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_ca_certificate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_certificate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_key: String,
}

/// State of a single addon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddonState {
    pub disabled: bool,
}

impl AddonState {
    pub fn disabled(disabled: bool) -> Self {
        Self { disabled }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddonsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_load_balancing: Option<AddonState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_pod_autoscaling: Option<AddonState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_dashboard: Option<AddonState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_policy_config: Option<AddonState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyAbac {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpAllocationPolicy {
    pub use_ip_aliases: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_ipv4_cidr_block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub services_ipv4_cidr_block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenancePolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<MaintenanceWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_maintenance_window: Option<DailyMaintenanceWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyMaintenanceWindow {
    /// Start time in RFC3339 "HH:MM" format
    pub start_time: String,
    /// Output only
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
}

/// A long-running provider operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub name: String,
    pub operation_type: String,
    pub status: String,
    pub status_message: String,
    pub target_link: String,
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClusterRequest {
    pub update: ClusterUpdate,
}

impl UpdateClusterRequest {
    pub fn master_version(version: impl Into<String>) -> Self {
        Self {
            update: ClusterUpdate {
                desired_master_version: version.into(),
                ..Default::default()
            },
        }
    }

    pub fn node_version(version: impl Into<String>) -> Self {
        Self {
            update: ClusterUpdate {
                desired_node_version: version.into(),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterUpdate {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desired_master_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desired_node_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNodePoolRequest {
    pub node_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNodePoolSizeRequest {
    pub node_count: i64,
}
