//! Cluster targets of a test environment
//!
//! An environment has at most one hub and any number of managed clusters.
//! It is resolved once per invocation, either from the environment file
//! written by the test-environment tool or from explicit cluster names.

use crate::error::{DrctlError, DrctlResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Role of a cluster in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Hub,
    Managed,
}

impl Role {
    /// Deploy type used in overlay paths and workload names
    pub fn deploy_type(&self) -> &'static str {
        match self {
            Role::Hub => "hub",
            Role::Managed => "dr-cluster",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Hub => write!(f, "hub"),
            Role::Managed => write!(f, "managed"),
        }
    }
}

/// One addressable cluster; the name doubles as the kubeconfig context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub role: Role,
}

impl Target {
    pub fn hub(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Hub,
        }
    }

    pub fn managed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Managed,
        }
    }
}

/// Disaster recovery topology of the managed clusters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Clusters in different regions, async replication
    #[default]
    RegionalDr,
    /// Clusters in one metro area, sync replication
    MetroDr,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::RegionalDr => write!(f, "regional-dr"),
            Topology::MetroDr => write!(f, "metro-dr"),
        }
    }
}

/// Resolved set of clusters to deploy to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Environment name, when loaded from a file
    pub name: Option<String>,
    pub hub: Option<Target>,
    pub managed: Vec<Target>,
    pub topology: Topology,
}

#[derive(Deserialize)]
struct EnvFile {
    name: Option<String>,
    ramen: Option<RamenSection>,
}

#[derive(Deserialize)]
struct RamenSection {
    hub: Option<String>,
    #[serde(default)]
    clusters: Vec<String>,
    #[serde(default)]
    topology: Topology,
}

impl Environment {
    /// Build an environment from cluster names
    pub fn from_names(hub: Option<String>, clusters: Vec<String>) -> Self {
        Self {
            hub: hub.map(Target::hub),
            managed: clusters.into_iter().map(Target::managed).collect(),
            ..Default::default()
        }
    }

    /// Parse the `ramen` section of an environment file
    pub fn parse(content: &str, name_prefix: Option<&str>) -> Result<Self, String> {
        let file: EnvFile = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let ramen = file
            .ramen
            .ok_or_else(|| "missing 'ramen' section".to_string())?;

        let prefix = name_prefix.unwrap_or_default();
        Ok(Self {
            name: file.name,
            topology: ramen.topology,
            ..Self::from_names(
                ramen.hub.map(|h| format!("{prefix}{h}")),
                ramen
                    .clusters
                    .into_iter()
                    .map(|c| format!("{prefix}{c}"))
                    .collect(),
            )
        })
    }

    /// Load an environment file
    pub async fn load(path: &Path, name_prefix: Option<&str>) -> DrctlResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DrctlError::io(format!("reading environment file {}", path.display()), e)
        })?;

        Self::parse(&content, name_prefix).map_err(|reason| DrctlError::EnvInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// All targets, hub first
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.hub.iter().chain(self.managed.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.hub.is_none() && self.managed.is_empty()
    }

    /// The hub and the first two managed clusters, which form a DR pair
    pub fn dr_pair(&self) -> DrctlResult<(&str, &str, &str)> {
        let hub = self.hub.as_ref().ok_or(DrctlError::EnvIncomplete("hub"))?;
        match self.managed.as_slice() {
            [c1, c2, ..] => Ok((&hub.name, &c1.name, &c2.name)),
            _ => Err(DrctlError::EnvIncomplete("pair of managed clusters")),
        }
    }
}
