//! Driver capability flags

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Optional operations a driver may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    GetVersion,
    SetVersion,
    GetClusterSize,
    SetClusterSize,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::GetVersion => "get-version",
            Capability::SetVersion => "set-version",
            Capability::GetClusterSize => "get-cluster-size",
            Capability::SetClusterSize => "set-cluster-size",
        };
        f.write_str(name)
    }
}

/// Set of capabilities advertised by a driver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
