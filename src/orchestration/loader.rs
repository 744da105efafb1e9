//! Image loader abstraction
//!
//! Provides a trait for loading a saved image archive into a cluster's
//! container runtime. The implementation depends on the host, not on the
//! cluster:
//! - Linux: minikube `image load`
//! - macOS: containerd inside the Lima guest, fed over `limactl shell`

use crate::error::DrctlResult;
use async_trait::async_trait;
use std::path::Path;

/// Loads an image archive into a cluster
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load the image archive at `tar` into the runtime of `cluster`
    async fn load(&self, cluster: &str, tar: &Path) -> DrctlResult<()>;

    /// Get the human-readable loader name for display
    fn loader_name(&self) -> &'static str;
}
