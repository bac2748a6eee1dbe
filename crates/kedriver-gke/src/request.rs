//! Create-cluster request construction

use crate::api::{
    AddonState, AddonsConfig, Cluster, CreateClusterRequest, DailyMaintenanceWindow,
    IpAllocationPolicy, LegacyAbac, MaintenancePolicy, MaintenanceWindow, MasterAuth, NodeConfig,
};
use crate::state::ClusterState;
use std::collections::BTreeMap;

/// Username set on the cluster's master auth; the provider generates the password
pub const MASTER_USERNAME: &str = "admin";

/// Sentinel that turns off a Stackdriver service
pub const SERVICE_NONE: &str = "none";

/// Resource label carrying the lower-cased display name
pub const DISPLAY_NAME_LABEL: &str = "display-name";

/// Build the create request for a decoded state
pub fn build(state: &ClusterState) -> CreateClusterRequest {
    let mut cluster = Cluster {
        name: state.name.clone(),
        zone: state.zone.clone(),
        description: state.description.clone(),
        initial_cluster_version: state.master_version.clone(),
        initial_node_count: state.node_count,
        enable_kubernetes_alpha: state.enable_alpha_feature,
        network: state.network.clone(),
        subnetwork: state.sub_network.clone(),
        locations: state.locations.clone(),
        node_config: Some(NodeConfig {
            machine_type: state.node_config.machine_type.clone(),
            disk_size_gb: state.node_config.disk_size_gb,
            disk_type: state.node_config.disk_type.clone(),
            image_type: state.node_config.image_type.clone(),
            labels: state.node_config.labels.clone(),
        }),
        addons_config: Some(AddonsConfig {
            http_load_balancing: Some(AddonState::disabled(
                state.enable_http_load_balancing.is_disabled(),
            )),
            horizontal_pod_autoscaling: Some(AddonState::disabled(
                state.enable_horizontal_pod_autoscaling.is_disabled(),
            )),
            kubernetes_dashboard: Some(AddonState::disabled(!state.enable_kubernetes_dashboard)),
            network_policy_config: Some(AddonState::disabled(
                state.enable_network_policy_config.is_disabled(),
            )),
        }),
        legacy_abac: Some(LegacyAbac {
            enabled: state.enable_legacy_abac.is_enabled(),
        }),
        master_auth: Some(MasterAuth {
            username: MASTER_USERNAME.to_string(),
            ..Default::default()
        }),
        resource_labels: BTreeMap::from([(
            DISPLAY_NAME_LABEL.to_string(),
            state.display_name.to_lowercase(),
        )]),
        ..Default::default()
    };

    // A services range needs alias IPs, which take the pod range as a block
    // instead of the top-level CIDR field.
    if state.services_ipv4_cidr.is_empty() {
        cluster.cluster_ipv4_cidr = state.cluster_ipv4_cidr.clone();
    } else {
        cluster.ip_allocation_policy = Some(IpAllocationPolicy {
            use_ip_aliases: true,
            cluster_ipv4_cidr_block: state.cluster_ipv4_cidr.clone(),
            services_ipv4_cidr_block: state.services_ipv4_cidr.clone(),
        });
    }

    // Stackdriver is on by default; only an explicit false turns it off
    if state.enable_stackdriver_logging.is_disabled() {
        cluster.logging_service = SERVICE_NONE.to_string();
    }
    if state.enable_stackdriver_monitoring.is_disabled() {
        cluster.monitoring_service = SERVICE_NONE.to_string();
    }

    if !state.maintenance_window.is_empty() {
        cluster.maintenance_policy = Some(MaintenancePolicy {
            window: Some(MaintenanceWindow {
                daily_maintenance_window: Some(DailyMaintenanceWindow {
                    start_time: state.maintenance_window.clone(),
                    ..Default::default()
                }),
            }),
        });
    }

    CreateClusterRequest { cluster }
}
