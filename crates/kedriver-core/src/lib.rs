//! # kedriver-core
//!
//! Core library for kedriver providing:
//! - The typed option bag handed to drivers by the orchestration layer
//! - The cluster-info record drivers read from and write into
//! - Runtime configuration loading (file + environment overrides)
//! - A cancellable status wait engine with observer hooks
//! - The `ClusterDriver` trait implemented by each provider driver

pub mod config;
pub mod driver;
pub mod error;
pub mod options;
pub mod types;
pub mod wait;

pub use config::{ApiConfig, ConfigLoader, DriverConfig, WaitConfig};
pub use driver::ClusterDriver;
pub use error::{Error, Result};
pub use options::{DriverOptions, OptionKey, OptionValue, Toggle};
pub use types::{Capabilities, Capability, ClusterInfo, KubernetesVersion, NodeCount};
