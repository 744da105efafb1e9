//! Host platform detection and image loader selection

use crate::error::{DrctlError, DrctlResult};
use crate::orchestration::lima::LimaLoader;
use crate::orchestration::loader::ImageLoader;
use crate::orchestration::minikube::MinikubeLoader;
use crate::process::CommandRunner;
use std::sync::Arc;

/// Detected host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// macOS - clusters run in Lima guests
    MacOS,
    /// Linux - clusters run in minikube
    Linux,
    /// Unsupported platform, with the OS name
    Unsupported(String),
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOS,
            "linux" => Platform::Linux,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Get a human-readable platform name
    pub fn name(&self) -> &str {
        match self {
            Platform::MacOS => "macOS",
            Platform::Linux => "Linux",
            Platform::Unsupported(os) => os,
        }
    }
}

/// Create the image loader for a platform
///
/// # Arguments
/// * `platform` - The host platform
/// * `runner` - Runs the loader's external commands
/// * `guest_namespace` - containerd namespace used inside Lima guests
///
/// # Returns
/// * `Ok(Arc<dyn ImageLoader>)` - A shared loader implementation
/// * `Err` - If the platform is unsupported
pub fn create_loader(
    platform: &Platform,
    runner: Arc<dyn CommandRunner>,
    guest_namespace: &str,
) -> DrctlResult<Arc<dyn ImageLoader>> {
    match platform {
        Platform::Linux => Ok(Arc::new(MinikubeLoader::new(runner))),
        Platform::MacOS => Ok(Arc::new(LimaLoader::new(runner, guest_namespace))),
        Platform::Unsupported(os) => Err(DrctlError::UnsupportedPlatform(os.clone())),
    }
}
