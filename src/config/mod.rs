//! Settings file handling for drctl

pub mod schema;

pub use schema::Config;

use crate::error::{DrctlError, DrctlResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Locates, loads and initializes the settings file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `path`, or `~/.config/drctl/config.toml` when not given
    pub fn new(path: Option<PathBuf>) -> Self {
        let config_path = path.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("drctl")
                .join("config.toml")
        });
        Self { config_path }
    }

    /// Load settings, falling back to defaults if the file does not exist
    pub async fn load(&self) -> DrctlResult<Config> {
        let path = &self.config_path;
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(DrctlError::io(format!("reading {}", path.display()), e));
            }
        };

        toml::from_str(&content).map_err(|e| DrctlError::ConfigInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write default settings. An existing file is kept unless `force` is
    /// set; returns whether the file was written.
    pub async fn init(&self, force: bool) -> DrctlResult<bool> {
        let path = &self.config_path;
        if !force && fs::try_exists(path).await.unwrap_or(false) {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DrctlError::io(format!("creating {}", parent.display()), e))?;
        }
        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(path, content)
            .await
            .map_err(|e| DrctlError::io(format!("writing {}", path.display()), e))?;

        debug!("Settings written to {}", path.display());
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
