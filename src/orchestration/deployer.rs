//! Concurrent deployment to every cluster of an environment
//!
//! Each cluster gets its own task running load → apply → rollout wait.
//! Tasks never cancel each other: all of them run to completion and every
//! outcome is collected into a [`DeployReport`].

use crate::config::schema::DeployConfig;
use crate::environment::{Environment, Role, Target};
use crate::error::{DrctlError, DrctlResult, TargetFailure};
use crate::orchestration::kubectl::Kubectl;
use crate::orchestration::loader::ImageLoader;
use crate::orchestration::platform::{create_loader, Platform};
use crate::orchestration::podman;
use crate::process::{Cmd, CommandRunner};
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Settings shared by all per-cluster tasks
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Operator source tree holding the `config/` overlays
    pub source_dir: PathBuf,
    /// Namespace the operator runs in
    pub namespace: String,
    /// Rollout wait timeout per cluster
    pub rollout_timeout: Duration,
    /// Distribution qualifier of the hub overlay
    pub hub_distro: String,
    /// Prefix of the operator deployment names
    pub workload_prefix: String,
    /// Run `make resources` before saving the image
    pub prepare_resources: bool,
}

impl DeploySettings {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            namespace: config.namespace.clone(),
            rollout_timeout: Duration::from_secs(config.rollout_timeout_secs),
            hub_distro: config.hub_distro.clone(),
            workload_prefix: config.workload_prefix.clone(),
            prepare_resources: config.prepare_resources,
        }
    }

    /// Overlay rendered for a cluster role
    pub fn overlay(&self, role: Role) -> PathBuf {
        let overlay = self
            .source_dir
            .join("config")
            .join(role.deploy_type())
            .join("default");
        match role {
            Role::Hub => overlay.join(&self.hub_distro),
            Role::Managed => overlay,
        }
    }

    /// Name of the operator deployment for a cluster role
    pub fn workload(&self, role: Role) -> String {
        format!("{}-{}-operator", self.workload_prefix, role.deploy_type())
    }
}

/// Result of deploying to one cluster
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: Target,
    pub result: DrctlResult<()>,
}

/// Outcomes of a deploy run, in target order (hub first)
#[derive(Debug, Default)]
pub struct DeployReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl DeployReport {
    /// Names of clusters deployed successfully
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.target.name.as_str())
            .collect()
    }

    /// Outcomes of clusters that failed
    pub fn failed(&self) -> Vec<&TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Succeeded cluster names, or an error carrying every failure
    pub fn into_result(self) -> DrctlResult<Vec<String>> {
        let mut succeeded = Vec::new();
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome.result {
                Ok(()) => succeeded.push(outcome.target.name),
                Err(error) => failures.push(TargetFailure {
                    cluster: outcome.target.name,
                    error,
                }),
            }
        }

        if failures.is_empty() {
            Ok(succeeded)
        } else {
            Err(DrctlError::DeployFailed { failures })
        }
    }
}

/// Deploys the operator image to hub and managed clusters
pub struct Deployer {
    runner: Arc<dyn CommandRunner>,
    loader: Arc<dyn ImageLoader>,
    kubectl: Kubectl,
    settings: Arc<DeploySettings>,
}

impl Deployer {
    /// Create a deployer, selecting the image loader for `platform`.
    ///
    /// Fails with [`DrctlError::UnsupportedPlatform`] before anything runs
    /// if the host cannot load images.
    pub fn new(
        platform: &Platform,
        runner: Arc<dyn CommandRunner>,
        settings: DeploySettings,
        guest_namespace: &str,
    ) -> DrctlResult<Self> {
        let loader = create_loader(platform, runner.clone(), guest_namespace)?;
        Ok(Self::with_loader(loader, runner, settings))
    }

    /// Create a deployer with an explicit image loader
    pub fn with_loader(
        loader: Arc<dyn ImageLoader>,
        runner: Arc<dyn CommandRunner>,
        settings: DeploySettings,
    ) -> Self {
        Self {
            kubectl: Kubectl::new(runner.clone()),
            runner,
            loader,
            settings: Arc::new(settings),
        }
    }

    /// Name of the selected image loader
    pub fn loader_name(&self) -> &'static str {
        self.loader.loader_name()
    }

    /// Prepare resources, save `image` to a temporary archive and deploy it
    /// to every cluster.
    ///
    /// The temporary directory is removed once all clusters finished,
    /// whatever the outcome.
    pub async fn run(&self, env: &Environment, image: &str) -> DrctlResult<DeployReport> {
        if env.is_empty() {
            return Err(DrctlError::NoTargets);
        }

        if self.settings.prepare_resources {
            info!("Preparing resources");
            let cmd = Cmd::new("make")
                .arg("-C")
                .arg(self.settings.source_dir.display().to_string())
                .arg("resources");
            self.runner.run(&cmd).await?;
        }

        let tmpdir = tempfile::Builder::new()
            .prefix("drctl-deploy-")
            .tempdir()
            .map_err(|e| DrctlError::io("creating temporary directory", e))?;
        let tar = tmpdir.path().join("image.tar");

        podman::save_image(self.runner.as_ref(), image, &tar).await?;

        let report = self.deploy_all(env, &tar).await;

        let path = tmpdir.path().to_path_buf();
        if let Err(e) = tmpdir.close() {
            warn!("Failed to remove {}: {}", path.display(), e);
        }

        Ok(report)
    }

    /// Deploy the image archive at `tar` to all clusters concurrently.
    ///
    /// Returns after every cluster finished, successfully or not.
    pub async fn deploy_all(&self, env: &Environment, tar: &Path) -> DeployReport {
        let targets: Vec<Target> = env.targets().cloned().collect();

        let handles: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let loader = self.loader.clone();
                let kubectl = self.kubectl.clone();
                let settings = self.settings.clone();
                let tar = tar.to_path_buf();
                tokio::spawn(async move {
                    deploy_target(loader.as_ref(), &kubectl, &settings, &target, &tar).await
                })
            })
            .collect();

        let results = join_all(handles).await;

        let outcomes = targets
            .into_iter()
            .zip(results)
            .map(|(target, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    Err(DrctlError::Internal(format!(
                        "deploy task for cluster '{}' failed: {}",
                        target.name, e
                    )))
                });
                if let Err(e) = &result {
                    warn!("Deploy failed in cluster '{}': {}", target.name, e);
                }
                TargetOutcome { target, result }
            })
            .collect();

        DeployReport { outcomes }
    }
}

/// Load, apply and wait for rollout in a single cluster
async fn deploy_target(
    loader: &dyn ImageLoader,
    kubectl: &Kubectl,
    settings: &DeploySettings,
    target: &Target,
    tar: &Path,
) -> DrctlResult<()> {
    let cluster = target.name.as_str();

    info!("Loading image in cluster '{}'", cluster);
    loader.load(cluster, tar).await?;

    info!("Deploying operator in cluster '{}'", cluster);
    let manifest = kubectl.kustomize(&settings.overlay(target.role)).await?;
    kubectl.apply(manifest, cluster).await?;

    let workload = settings.workload(target.role);
    info!(
        "Waiting until '{}' is rolled out in cluster '{}'",
        workload, cluster
    );
    kubectl
        .rollout_status(
            &workload,
            &settings.namespace,
            cluster,
            settings.rollout_timeout,
        )
        .await
}
