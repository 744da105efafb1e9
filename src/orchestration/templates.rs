//! Manifests applied by hub configuration
//!
//! Templates are compiled into the binary and use `$name` placeholders.
//! Every placeholder must be given a value; leftovers are an error rather
//! than an empty string in a manifest.

use crate::environment::Topology;
use crate::error::{DrctlError, DrctlResult};

/// S3 secret used by the hub operator
pub const S3_SECRET: Template = Template {
    name: "ramen-s3-secret.yaml",
    text: include_str!("../../resources/ramen-s3-secret.yaml"),
};

/// Velero cloud credentials copied to each managed cluster
pub const CLOUD_CREDENTIALS: Template = Template {
    name: "cloud-credentials-secret.yaml",
    text: include_str!("../../resources/cloud-credentials-secret.yaml"),
};

/// Hub operator config map
pub const CONFIGMAP: Template = Template {
    name: "configmap.yaml",
    text: include_str!("../../resources/configmap.yaml"),
};

const REGIONAL_DR_CLUSTERS: Template = Template {
    name: "regional-dr/dr-clusters.yaml",
    text: include_str!("../../resources/regional-dr/dr-clusters.yaml"),
};

const REGIONAL_DR_POLICY: Template = Template {
    name: "regional-dr/dr-policy.yaml",
    text: include_str!("../../resources/regional-dr/dr-policy.yaml"),
};

const METRO_DR_CLUSTERS: Template = Template {
    name: "metro-dr/dr-clusters.yaml",
    text: include_str!("../../resources/metro-dr/dr-clusters.yaml"),
};

const METRO_DR_POLICY: Template = Template {
    name: "metro-dr/dr-policy.yaml",
    text: include_str!("../../resources/metro-dr/dr-policy.yaml"),
};

/// A manifest with `$name` placeholders
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    text: &'static str,
}

impl Template {
    /// Substitute every placeholder from `vars`
    pub fn render(&self, vars: &[(&str, &str)]) -> DrctlResult<String> {
        let lookup = |key: &str| match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => Ok(Some(*value)),
            None => Err("no value given".to_string()),
        };

        shellexpand::env_with_context(self.text, lookup)
            .map(|text| text.into_owned())
            .map_err(|e| DrctlError::Template {
                name: self.name,
                reason: e.to_string(),
            })
    }
}

/// DRCluster and DRPolicy templates of a topology, in apply order
pub fn dr_resources(topology: Topology) -> [Template; 2] {
    match topology {
        Topology::RegionalDr => [REGIONAL_DR_CLUSTERS, REGIONAL_DR_POLICY],
        Topology::MetroDr => [METRO_DR_CLUSTERS, METRO_DR_POLICY],
    }
}
