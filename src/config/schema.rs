//! Configuration schema for drctl
//!
//! Configuration is stored at `~/.config/drctl/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Deploy settings
    pub deploy: DeployConfig,

    /// Hub configuration settings
    pub configure: ConfigureConfig,

    /// Bundle cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Deploy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Operator image to deploy
    pub image: String,

    /// Namespace the operator runs in
    pub namespace: String,

    /// Operator source tree holding the `config/` overlays
    pub source_dir: PathBuf,

    /// Rollout wait timeout per cluster, in seconds
    pub rollout_timeout_secs: u64,

    /// Distribution qualifier of the hub overlay
    pub hub_distro: String,

    /// Prefix of the operator deployment names
    pub workload_prefix: String,

    /// containerd namespace used when loading images inside a Lima guest
    pub guest_namespace: String,

    /// Run `make resources` in the source tree before deploying
    pub prepare_resources: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            image: "quay.io/ramendr/ramen-operator:latest".to_string(),
            namespace: "ramen-system".to_string(),
            source_dir: PathBuf::from("."),
            rollout_timeout_secs: 120,
            hub_distro: "k8s".to_string(),
            workload_prefix: "ramen".to_string(),
            guest_namespace: "k8s.io".to_string(),
            prepare_resources: true,
        }
    }
}

/// Hub configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigureConfig {
    /// Timeout of each rollout, phase and condition wait, in seconds
    pub timeout_secs: u64,
}

impl Default for ConfigureConfig {
    fn default() -> Self {
        Self { timeout_secs: 180 }
    }
}

/// Bundle cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root (default: `$XDG_CACHE_HOME/drctl` or `~/.cache/drctl`)
    pub root: Option<PathBuf>,

    /// Rebuild on refresh when older than this many hours
    pub refresh_hours: u64,

    /// Rebuild on get when older than this many hours
    pub fetch_hours: u64,
}

impl CacheConfig {
    /// Cache root: `root` if set, then `$XDG_CACHE_HOME/drctl`, then
    /// `~/.cache/drctl`
    pub fn root_dir(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }

        std::env::var_os("XDG_CACHE_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".cache")
            })
            .join("drctl")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            refresh_hours: 12,
            fetch_hours: 48,
        }
    }
}
