//! Image loading for minikube clusters on Linux hosts

use crate::error::DrctlResult;
use crate::orchestration::loader::ImageLoader;
use crate::process::{Cmd, CommandRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Loads images with `minikube image load`, one profile per cluster
pub struct MinikubeLoader {
    runner: Arc<dyn CommandRunner>,
}

impl MinikubeLoader {
    /// Create a new minikube loader
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn load_command(cluster: &str, tar: &Path) -> Cmd {
        Cmd::new("minikube").args([
            "--profile".to_string(),
            cluster.to_string(),
            "image".to_string(),
            "load".to_string(),
            tar.display().to_string(),
        ])
    }
}

#[async_trait]
impl ImageLoader for MinikubeLoader {
    async fn load(&self, cluster: &str, tar: &Path) -> DrctlResult<()> {
        debug!("Loading {} into minikube profile {}", tar.display(), cluster);
        self.runner.run(&Self::load_command(cluster, tar)).await?;
        Ok(())
    }

    fn loader_name(&self) -> &'static str {
        "minikube"
    }
}
