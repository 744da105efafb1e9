//! Configuration for the end-to-end test suite
//!
//! The suite addresses clusters by role (`hub`, `c1`, `c2`) and reads one
//! self-contained kubeconfig per cluster.

use crate::environment::Environment;
use crate::error::{DrctlError, DrctlResult};
use crate::orchestration::kubectl::Kubectl;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const E2E_NAMES: [&str; 3] = ["hub", "c1", "c2"];

#[derive(Debug, Serialize)]
struct E2eConfig {
    clusters: BTreeMap<&'static str, E2eCluster>,
}

#[derive(Debug, Serialize)]
struct E2eCluster {
    kubeconfigpath: PathBuf,
}

/// Default output directory of the environment `name`
pub fn default_output_dir(name: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("drenv")
        .join(name)
}

/// Write `<base>/kubeconfigs/<cluster>` for the hub and first two managed
/// clusters, and `<base>/config.yaml` mapping e2e names to them.
///
/// A missing hub is skipped. Returns the path of `config.yaml`.
pub async fn dump_e2e_config(
    env: &Environment,
    kubectl: &Kubectl,
    base: &Path,
) -> DrctlResult<PathBuf> {
    info!("Dumping e2e config to {}", base.display());

    let kubeconfigs = base.join("kubeconfigs");
    fs::create_dir_all(&kubeconfigs)
        .await
        .map_err(|e| DrctlError::io(format!("creating {}", kubeconfigs.display()), e))?;

    let clusters = std::iter::once(env.hub.as_ref())
        .chain(env.managed.iter().map(Some))
        .zip(E2E_NAMES);

    let mut config = E2eConfig {
        clusters: BTreeMap::new(),
    };
    for (target, e2e_name) in clusters {
        let Some(target) = target else { continue };

        let data = kubectl.config_view(&target.name).await?;
        let path = kubeconfigs.join(&target.name);
        fs::write(&path, data)
            .await
            .map_err(|e| DrctlError::io(format!("writing {}", path.display()), e))?;

        config.clusters.insert(
            e2e_name,
            E2eCluster {
                kubeconfigpath: path,
            },
        );
    }

    let path = base.join("config.yaml");
    fs::write(&path, serde_yaml::to_string(&config)?)
        .await
        .map_err(|e| DrctlError::io(format!("writing {}", path.display()), e))?;
    Ok(path)
}
