//! Type definitions shared between drivers and their callers

mod capabilities;
mod cluster_info;

pub use capabilities::{Capabilities, Capability};
pub use cluster_info::{ClusterInfo, KubernetesVersion, NodeCount};
