//! kubectl operations used by deploy and hub configuration

use crate::error::DrctlResult;
use crate::process::{Cmd, CommandRunner, Stdin};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Thin wrapper running kubectl through a [`CommandRunner`]
#[derive(Clone)]
pub struct Kubectl {
    runner: Arc<dyn CommandRunner>,
}

impl Kubectl {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Render an overlay without load restrictions, so overlays may
    /// reference files outside their directory
    pub async fn kustomize(&self, overlay: &Path) -> DrctlResult<Vec<u8>> {
        let cmd = Cmd::new("kubectl")
            .arg("kustomize")
            .arg(overlay.display().to_string())
            .arg("--load-restrictor=LoadRestrictionsNone");
        self.runner.run(&cmd).await
    }

    /// Apply a rendered manifest in `context`
    pub async fn apply(&self, manifest: Vec<u8>, context: &str) -> DrctlResult<()> {
        let cmd = Cmd::new("kubectl")
            .arg(format!("--context={context}"))
            .args(["apply", "--filename=-"])
            .stdin(Stdin::Bytes(manifest));
        self.runner.run(&cmd).await?;
        Ok(())
    }

    /// Wait until a deployment is rolled out
    pub async fn rollout_status(
        &self,
        deployment: &str,
        namespace: &str,
        context: &str,
        timeout: Duration,
    ) -> DrctlResult<()> {
        let cmd = Cmd::new("kubectl")
            .arg(format!("--context={context}"))
            .args(["rollout", "status"])
            .arg(format!("deploy/{deployment}"))
            .arg(format!("--namespace={namespace}"))
            .arg(format!("--timeout={}s", timeout.as_secs()));
        self.runner.run(&cmd).await?;
        Ok(())
    }

    /// Read a field of `resource` with an `--output` expression such as
    /// `jsonpath={.spec}`. Surrounding whitespace is trimmed.
    pub async fn get(
        &self,
        resource: &str,
        namespace: Option<&str>,
        output: &str,
        context: &str,
    ) -> DrctlResult<String> {
        let mut cmd = Cmd::new("kubectl")
            .arg(format!("--context={context}"))
            .args(["get", resource]);
        if let Some(ns) = namespace {
            cmd = cmd.arg(format!("--namespace={ns}"));
        }
        let out = self.runner.run(&cmd.arg(format!("--output={output}"))).await?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// Wait until `resource` meets `condition` (a `--for` expression)
    pub async fn wait(
        &self,
        resource: &str,
        condition: &str,
        namespace: &str,
        context: &str,
        timeout: Duration,
    ) -> DrctlResult<()> {
        self.wait_on(&[resource], condition, namespace, context, timeout)
            .await
    }

    /// Wait until every resource of `kind` meets `condition`
    pub async fn wait_all(
        &self,
        kind: &str,
        condition: &str,
        namespace: &str,
        context: &str,
        timeout: Duration,
    ) -> DrctlResult<()> {
        self.wait_on(&[kind, "--all"], condition, namespace, context, timeout)
            .await
    }

    async fn wait_on(
        &self,
        selector: &[&str],
        condition: &str,
        namespace: &str,
        context: &str,
        timeout: Duration,
    ) -> DrctlResult<()> {
        let cmd = Cmd::new("kubectl")
            .arg(format!("--context={context}"))
            .arg("wait")
            .args(selector.iter().copied())
            .arg(format!("--for={condition}"))
            .arg(format!("--namespace={namespace}"))
            .arg(format!("--timeout={}s", timeout.as_secs()));
        self.runner.run(&cmd).await?;
        Ok(())
    }

    /// Self-contained kubeconfig of `context`, credentials inlined
    pub async fn config_view(&self, context: &str) -> DrctlResult<Vec<u8>> {
        let cmd = Cmd::new("kubectl")
            .arg(format!("--context={context}"))
            .args(["config", "view", "--flatten", "--minify"]);
        self.runner.run(&cmd).await
    }
}
