//! Image loading for Lima VM clusters on macOS hosts
//!
//! The cluster runs inside a Lima guest, so the archive is streamed over
//! `limactl shell` into `nerdctl load` under the containerd namespace that
//! kubelet uses.

use crate::error::DrctlResult;
use crate::orchestration::loader::ImageLoader;
use crate::process::{Cmd, CommandRunner, Stdin};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Default containerd namespace of kubernetes images
pub const DEFAULT_GUEST_NAMESPACE: &str = "k8s.io";

/// Loads images into the containerd of a Lima guest
pub struct LimaLoader {
    runner: Arc<dyn CommandRunner>,
    namespace: String,
}

impl LimaLoader {
    /// Create a new Lima loader using the given containerd namespace
    pub fn new(runner: Arc<dyn CommandRunner>, namespace: impl Into<String>) -> Self {
        Self {
            runner,
            namespace: namespace.into(),
        }
    }

    fn load_command(&self, cluster: &str, tar: &Path) -> Cmd {
        Cmd::new("limactl")
            .args(["shell", cluster, "sudo", "nerdctl", "--namespace"])
            .arg(self.namespace.as_str())
            .arg("load")
            .stdin(Stdin::File(tar.to_path_buf()))
    }

    /// Get the containerd namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl ImageLoader for LimaLoader {
    async fn load(&self, cluster: &str, tar: &Path) -> DrctlResult<()> {
        self.runner.run(&self.load_command(cluster, tar)).await?;
        Ok(())
    }

    fn loader_name(&self) -> &'static str {
        "lima"
    }
}
