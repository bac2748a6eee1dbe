//! # kedriver-gke
//!
//! Google Kubernetes Engine driver for kedriver.
//!
//! - [`state`]: decodes the option bag into a [`ClusterState`] and persists it
//!   in the cluster-info metadata
//! - [`request`]: maps a state onto a create-cluster request
//! - [`credentials`]: resolves an explicit credential source into a token provider
//! - [`api`]: the container API seam and its HTTP implementation
//! - [`GkeDriver`]: the lifecycle operations

pub mod api;
pub mod credentials;
pub mod driver;
pub mod request;
pub mod state;
pub mod wait;

pub use credentials::{ClientFactory, CredentialResolver, CredentialSource, HttpClientFactory};
pub use driver::{GkeDriver, ServiceAccountTokenMinter};
pub use state::{ClusterState, NodePoolConfig};
