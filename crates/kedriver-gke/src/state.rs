//! Driver state: decoding from options and persistence in cluster metadata
//!
//! The decoded [`ClusterState`] is stored as one JSON document under the
//! `state` metadata key. Project and zone are also copied into their own
//! plaintext keys so the orchestration layer can read them without parsing.

use crate::api::ClusterRef;
use kedriver_core::{ClusterInfo, DriverOptions, Error, Result, Toggle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key holding the serialized state
pub const STATE_KEY: &str = "state";
/// Metadata key holding the project id in plaintext
pub const PROJECT_ID_KEY: &str = "project-id";
/// Metadata key holding the zone in plaintext
pub const ZONE_KEY: &str = "zone";
/// Metadata key holding the first node pool's name
pub const NODE_POOL_KEY: &str = "nodePool";

/// Recognized option names, each with its accepted aliases in lookup order
pub mod keys {
    use kedriver_core::OptionKey;

    pub const NAME: OptionKey = OptionKey::new(&["name"]);
    pub const DISPLAY_NAME: OptionKey = OptionKey::new(&["display-name", "displayName"]);
    pub const PROJECT_ID: OptionKey = OptionKey::new(&["project-id", "projectId"]);
    pub const ZONE: OptionKey = OptionKey::new(&["zone"]);
    pub const NODE_POOL: OptionKey = OptionKey::new(&["nodePool", "node-pool"]);
    pub const CLUSTER_IPV4_CIDR: OptionKey =
        OptionKey::new(&["cluster-ipv4-cidr", "clusterIpv4Cidr"]);
    pub const SERVICES_IPV4_CIDR: OptionKey =
        OptionKey::new(&["services-ipv4-cidr", "servicesIpv4Cidr"]);
    pub const DESCRIPTION: OptionKey = OptionKey::new(&["description"]);
    pub const MASTER_VERSION: OptionKey = OptionKey::new(&["master-version", "masterVersion"]);
    pub const NODE_VERSION: OptionKey = OptionKey::new(&["node-version", "nodeVersion"]);
    pub const NODE_COUNT: OptionKey = OptionKey::new(&["node-count", "nodeCount"]);
    pub const DISK_SIZE_GB: OptionKey = OptionKey::new(&["disk-size-gb", "diskSizeGb"]);
    pub const DISK_TYPE: OptionKey = OptionKey::new(&["disk-type", "diskType"]);
    pub const MACHINE_TYPE: OptionKey = OptionKey::new(&["machine-type", "machineType"]);
    pub const IMAGE_TYPE: OptionKey = OptionKey::new(&["image-type", "imageType"]);
    pub const LABELS: OptionKey = OptionKey::new(&["labels"]);
    pub const CREDENTIAL_PATH: OptionKey = OptionKey::new(&["gke-credential-path"]);
    pub const CREDENTIAL: OptionKey = OptionKey::new(&["credential"]);
    pub const ENABLE_ALPHA_FEATURE: OptionKey =
        OptionKey::new(&["enable-alpha-feature", "enableAlphaFeature"]);
    pub const HTTP_LOAD_BALANCING: OptionKey =
        OptionKey::new(&["enable-http-load-balancing", "enableHttpLoadBalancing"]);
    pub const HORIZONTAL_POD_AUTOSCALING: OptionKey = OptionKey::new(&[
        "enable-horizontal-pod-autoscaling",
        "enableHorizontalPodAutoscaling",
    ]);
    pub const NETWORK_POLICY_CONFIG: OptionKey =
        OptionKey::new(&["enable-network-policy-config", "enableNetworkPolicyConfig"]);
    pub const KUBERNETES_DASHBOARD: OptionKey =
        OptionKey::new(&["kubernetes-dashboard", "enableKubernetesDashboard"]);
    pub const LEGACY_AUTHORIZATION: OptionKey =
        OptionKey::new(&["legacy-authorization", "enableLegacyAbac"]);
    pub const STACKDRIVER_LOGGING: OptionKey =
        OptionKey::new(&["enable-stackdriver-logging", "enableStackdriverLogging"]);
    pub const STACKDRIVER_MONITORING: OptionKey =
        OptionKey::new(&["enable-stackdriver-monitoring", "enableStackdriverMonitoring"]);
    pub const LOCATIONS: OptionKey = OptionKey::new(&["locations"]);
    pub const NETWORK: OptionKey = OptionKey::new(&["network"]);
    pub const SUB_NETWORK: OptionKey = OptionKey::new(&["sub-network", "subNetwork"]);
    pub const MAINTENANCE_WINDOW: OptionKey =
        OptionKey::new(&["maintenance-window", "maintenanceWindow"]);
}

/// Node pool settings used when the cluster is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePoolConfig {
    pub machine_type: String,
    pub disk_size_gb: i64,
    pub disk_type: String,
    pub image_type: String,
    pub labels: BTreeMap<String, String>,
}

/// Everything the driver knows about one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterState {
    /// Cluster name at the provider
    pub name: String,
    /// Human-facing name, stored lower-cased as a resource label
    pub display_name: String,
    pub project_id: String,
    pub zone: String,
    pub description: String,

    /// Pod address range
    pub cluster_ipv4_cidr: String,
    /// Service address range; switches the cluster to alias IPs when set
    pub services_ipv4_cidr: String,

    pub node_count: i64,
    pub master_version: String,
    pub node_version: String,
    pub node_config: NodePoolConfig,
    /// Name of the node pool managed by update and resize
    pub node_pool_id: String,

    /// Path to a credential file
    pub credential_path: String,
    /// Literal credential file content
    pub credential_content: String,

    pub enable_alpha_feature: bool,
    pub enable_http_load_balancing: Toggle,
    pub enable_horizontal_pod_autoscaling: Toggle,
    pub enable_network_policy_config: Toggle,
    /// Plain flag: the dashboard is off unless asked for
    pub enable_kubernetes_dashboard: bool,
    pub enable_legacy_abac: Toggle,
    pub enable_stackdriver_logging: Toggle,
    pub enable_stackdriver_monitoring: Toggle,

    pub locations: Vec<String>,
    pub network: String,
    pub sub_network: String,

    /// Daily maintenance window start time (e.g. "03:00")
    pub maintenance_window: String,
}

impl ClusterState {
    /// Decode options into a state and validate the cluster identity
    pub fn decode(options: &DriverOptions) -> Result<Self> {
        let state = Self::from_options(options);
        state.validate()?;
        Ok(state)
    }

    /// Decode options without validating
    ///
    /// Used by update, where identity fields may come from the persisted state.
    pub fn from_options(options: &DriverOptions) -> Self {
        Self {
            name: options.string(keys::NAME),
            display_name: options.string(keys::DISPLAY_NAME),
            project_id: options.string(keys::PROJECT_ID),
            zone: options.string(keys::ZONE),
            description: options.string(keys::DESCRIPTION),
            cluster_ipv4_cidr: options.string(keys::CLUSTER_IPV4_CIDR),
            services_ipv4_cidr: options.string(keys::SERVICES_IPV4_CIDR),
            node_count: options.int(keys::NODE_COUNT),
            master_version: options.string(keys::MASTER_VERSION),
            node_version: options.string(keys::NODE_VERSION),
            node_config: NodePoolConfig {
                machine_type: options.string(keys::MACHINE_TYPE),
                disk_size_gb: options.int(keys::DISK_SIZE_GB),
                disk_type: options.string(keys::DISK_TYPE),
                image_type: options.string(keys::IMAGE_TYPE),
                labels: parse_labels(&options.strings(keys::LABELS)),
            },
            node_pool_id: options.string(keys::NODE_POOL),
            credential_path: options.string(keys::CREDENTIAL_PATH),
            credential_content: options.string(keys::CREDENTIAL),
            enable_alpha_feature: options.flag(keys::ENABLE_ALPHA_FEATURE),
            enable_http_load_balancing: options.toggle(keys::HTTP_LOAD_BALANCING),
            enable_horizontal_pod_autoscaling: options.toggle(keys::HORIZONTAL_POD_AUTOSCALING),
            enable_network_policy_config: options.toggle(keys::NETWORK_POLICY_CONFIG),
            enable_kubernetes_dashboard: options.flag(keys::KUBERNETES_DASHBOARD),
            enable_legacy_abac: options.toggle(keys::LEGACY_AUTHORIZATION),
            enable_stackdriver_logging: options.toggle(keys::STACKDRIVER_LOGGING),
            enable_stackdriver_monitoring: options.toggle(keys::STACKDRIVER_MONITORING),
            locations: options.strings(keys::LOCATIONS),
            network: options.string(keys::NETWORK),
            sub_network: options.string(keys::SUB_NETWORK),
            maintenance_window: options.string(keys::MAINTENANCE_WINDOW),
        }
    }

    /// Check the fields every provider call needs
    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            Err(Error::validation("project ID is required"))
        } else if self.zone.is_empty() {
            Err(Error::validation("zone is required"))
        } else if self.name.is_empty() {
            Err(Error::validation("cluster name is required"))
        } else {
            Ok(())
        }
    }

    /// Fill identity, credentials and node pool from a previously persisted state
    ///
    /// Only fields left empty by the caller are taken over.
    pub fn inherit_from(&mut self, previous: &ClusterState) {
        fn fill(target: &mut String, source: &str) {
            if target.is_empty() {
                target.push_str(source);
            }
        }

        fill(&mut self.name, &previous.name);
        fill(&mut self.project_id, &previous.project_id);
        fill(&mut self.zone, &previous.zone);
        fill(&mut self.node_pool_id, &previous.node_pool_id);

        if self.credential_path.is_empty() && self.credential_content.is_empty() {
            self.credential_path = previous.credential_path.clone();
            self.credential_content = previous.credential_content.clone();
        }
    }

    /// Identity of the cluster at the provider
    pub fn cluster_ref(&self) -> ClusterRef {
        ClusterRef::new(&self.project_id, &self.zone, &self.name)
    }

    /// Serialize the state to its persisted JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a persisted JSON state
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::StateCorrupt { source })
    }

    /// Write the state into the record's metadata
    pub fn store(&self, info: &mut ClusterInfo) -> Result<()> {
        let json = self.to_json()?;
        info.set_metadata(STATE_KEY, json);
        info.set_metadata(PROJECT_ID_KEY, self.project_id.clone());
        info.set_metadata(ZONE_KEY, self.zone.clone());
        Ok(())
    }

    /// Read the state back out of the record's metadata
    ///
    /// Missing or corrupt state is an error; see [`ClusterState::restore_or_default`].
    pub fn restore(info: &ClusterInfo) -> Result<Self> {
        let json = info
            .metadata_value(STATE_KEY)
            .ok_or_else(|| Error::missing_state(STATE_KEY))?;
        Self::from_json(json)
    }

    /// Like [`ClusterState::restore`], but a record with no state yields an empty one
    ///
    /// Corrupt state is still an error.
    pub fn restore_or_default(info: &ClusterInfo) -> Result<Self> {
        match info.metadata_value(STATE_KEY) {
            Some(json) => Self::from_json(json),
            None => Ok(Self::default()),
        }
    }
}

/// Parse `key=value` entries, dropping any that do not split into exactly two parts
fn parse_labels(entries: &[String]) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split('=').collect();
            match parts.as_slice() {
                [key, value] => Some((key.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect()
}
