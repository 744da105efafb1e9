//! Configuring the hub operator after deploy
//!
//! The hub needs an S3 secret, a config map pointing at the MinIO store of
//! each managed cluster, the velero credentials copied to every managed
//! cluster, and DRCluster/DRPolicy resources for the environment topology.
//! Configuration is done once the resources report ready.

use crate::config::Config;
use crate::environment::Environment;
use crate::error::{DrctlError, DrctlResult};
use crate::orchestration::kubectl::Kubectl;
use crate::orchestration::templates::{self, CLOUD_CREDENTIALS, CONFIGMAP, S3_SECRET};
use crate::process::CommandRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

const NODE_IP: &str = r#"jsonpath={.items[0].status.addresses[?(@.type=="InternalIP")].address}"#;
const NODE_PORT: &str = "jsonpath={.spec.ports[0].nodePort}";

/// Applies the hub configuration of an environment
pub struct HubConfigurator {
    kubectl: Kubectl,
    namespace: String,
    hub_operator: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl HubConfigurator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        namespace: impl Into<String>,
        hub_operator: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            kubectl: Kubectl::new(runner),
            namespace: namespace.into(),
            hub_operator: hub_operator.into(),
            timeout,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Create a configurator from the deploy and configure settings
    pub fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(
            runner,
            config.deploy.namespace.clone(),
            format!("{}-hub-operator", config.deploy.workload_prefix),
            Duration::from_secs(config.configure.timeout_secs),
        )
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often DRCluster phases are polled
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Configure the hub of `env` and its first two managed clusters.
    ///
    /// Steps run in order and stop at the first failure.
    pub async fn run(&self, env: &Environment) -> DrctlResult<()> {
        let (hub, cluster1, cluster2) = env.dr_pair()?;
        let ns = self.namespace.as_str();

        info!("Waiting until {} is rolled out", self.hub_operator);
        self.kubectl
            .rollout_status(&self.hub_operator, ns, hub, self.timeout)
            .await?;

        info!("Creating s3 secret in namespace {}", ns);
        self.apply(S3_SECRET.render(&[("namespace", ns)])?, hub).await?;

        debug!("Getting velero cloud credentials from cluster {}", cluster1);
        let cloud = self
            .kubectl
            .get(
                "secret/cloud-credentials",
                Some("velero"),
                "jsonpath={.data.cloud}",
                cluster1,
            )
            .await?;
        if cloud.is_empty() {
            return Err(DrctlError::ResourceMissing {
                what: "velero cloud credentials".to_string(),
                cluster: cluster1.to_string(),
            });
        }
        let credentials =
            CLOUD_CREDENTIALS.render(&[("cloud", cloud.as_str()), ("namespace", ns)])?;
        for target in &env.managed {
            info!("Creating cloud credentials secret in cluster {}", target.name);
            self.apply(credentials.clone(), &target.name).await?;
        }

        info!("Updating ramen config map");
        let minio1 = self.service_url(cluster1).await?;
        let minio2 = self.service_url(cluster2).await?;
        let configmap = CONFIGMAP.render(&[
            ("auto_deploy", "true"),
            ("cluster1", cluster1),
            ("cluster2", cluster2),
            ("minio_url_cluster1", minio1.as_str()),
            ("minio_url_cluster2", minio2.as_str()),
            ("namespace", ns),
        ])?;
        self.apply(configmap, hub).await?;

        for template in templates::dr_resources(env.topology) {
            info!("Creating {} for {}", template.name, env.topology);
            let yaml = template.render(&[("cluster1", cluster1), ("cluster2", cluster2)])?;
            self.apply(yaml, hub).await?;
        }

        info!("Waiting until DRClusters report phase");
        for target in &env.managed {
            self.wait_for_phase(hub, &target.name).await?;
        }

        info!("Waiting until DRClusters phase is available");
        self.kubectl
            .wait_all(
                "drcluster",
                "jsonpath={.status.phase}=Available",
                ns,
                hub,
                self.timeout,
            )
            .await?;

        info!("Waiting until DRPolicy is validated");
        self.kubectl
            .wait(
                "drpolicy/dr-policy",
                "condition=Validated",
                ns,
                hub,
                self.timeout,
            )
            .await
    }

    async fn apply(&self, yaml: String, context: &str) -> DrctlResult<()> {
        self.kubectl.apply(yaml.into_bytes(), context).await
    }

    /// URL of the MinIO service of `cluster`, reached through a node port
    async fn service_url(&self, cluster: &str) -> DrctlResult<String> {
        let host = self.kubectl.get("node", None, NODE_IP, cluster).await?;
        let port = self
            .kubectl
            .get("service/minio", Some("minio"), NODE_PORT, cluster)
            .await?;

        if host.is_empty() || port.is_empty() {
            return Err(DrctlError::ResourceMissing {
                what: "minio node port".to_string(),
                cluster: cluster.to_string(),
            });
        }
        Ok(format!("http://{host}:{port}"))
    }

    /// Poll until the DRCluster `name` reports any phase
    async fn wait_for_phase(&self, hub: &str, name: &str) -> DrctlResult<()> {
        let resource = format!("drcluster/{name}");
        let deadline = Instant::now() + self.timeout;
        let mut last_error = String::from("no phase reported");

        while Instant::now() < deadline {
            match self
                .kubectl
                .get(
                    &resource,
                    Some(self.namespace.as_str()),
                    "jsonpath={.status.phase}",
                    hub,
                )
                .await
            {
                Ok(phase) if !phase.is_empty() => {
                    debug!("{} phase: {}", resource, phase);
                    return Ok(());
                }
                Ok(_) => last_error = String::from("no phase reported"),
                Err(e) => {
                    debug!("{} not ready yet: {}", resource, e);
                    last_error = e.to_string();
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(DrctlError::WaitTimeout {
            resource,
            timeout_secs: self.timeout.as_secs(),
            last_error,
        })
    }
}
