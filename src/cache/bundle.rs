//! Disk cache of rendered kustomization bundles

use crate::cache::entry::CacheEntry;
use crate::config::Config;
use crate::error::{DrctlError, DrctlResult};
use crate::process::{Cmd, CommandRunner};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const HOUR: u64 = 3600;

/// Default age after which `refresh` rebuilds an entry
pub const REFRESH_AFTER: Duration = Duration::from_secs(12 * HOUR);

/// Default age after which `get` rebuilds an entry
pub const FETCH_AFTER: Duration = Duration::from_secs(48 * HOUR);

const TMP_SUFFIX: &str = ".tmp";

/// Cache of `kustomize build` outputs keyed by relative path
pub struct BundleCache {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
    refresh_after: Duration,
    fetch_after: Duration,
}

impl BundleCache {
    /// Create a cache rooted at `root` with the default thresholds
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
            refresh_after: REFRESH_AFTER,
            fetch_after: FETCH_AFTER,
        }
    }

    /// Create a cache from configuration
    pub fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(config.cache.root_dir(), runner).with_thresholds(
            Duration::from_secs(config.cache.refresh_hours.saturating_mul(HOUR)),
            Duration::from_secs(config.cache.fetch_hours.saturating_mul(HOUR)),
        )
    }

    /// Override the refresh and fetch thresholds
    pub fn with_thresholds(mut self, refresh_after: Duration, fetch_after: Duration) -> Self {
        self.refresh_after = refresh_after;
        self.fetch_after = fetch_after;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `key`
    ///
    /// Keys are relative paths; empty keys, absolute keys and keys with
    /// `.` or `..` components are rejected. A key may not end in `.tmp`,
    /// which would alias the temporary file of a sibling entry.
    pub fn path(&self, key: &str) -> DrctlResult<PathBuf> {
        let rel = Path::new(key);
        let valid = !key.is_empty()
            && !rel
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(TMP_SUFFIX))
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(DrctlError::InvalidCacheKey(key.to_string()));
        }
        Ok(self.root.join(rel))
    }

    /// Remove the entry for `key`, or the entire cache if `key` is `None`.
    ///
    /// Removing something that does not exist is not an error.
    pub async fn clear(&self, key: Option<&str>) -> DrctlResult<()> {
        let path = match key {
            Some(key) => self.path(key)?,
            None => self.root.clone(),
        };

        let result = match fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                debug!("Cleared {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DrctlError::io(format!("removing {}", path.display()), e)),
        }
    }

    /// Rebuild the entry if it is older than the refresh threshold
    pub async fn refresh(&self, kustomization_dir: &Path, key: &str) -> DrctlResult<()> {
        let dest = self.path(key)?;
        if is_stale(entry_age(&dest).await?, self.refresh_after) {
            self.fetch(kustomization_dir, &dest).await?;
        }
        Ok(())
    }

    /// Return the path of the entry, rebuilding it first if it is older
    /// than the fetch threshold
    pub async fn get(&self, kustomization_dir: &Path, key: &str) -> DrctlResult<PathBuf> {
        let dest = self.path(key)?;
        if is_stale(entry_age(&dest).await?, self.fetch_after) {
            self.fetch(kustomization_dir, &dest).await?;
        }
        Ok(dest)
    }

    /// List all entries, sorted by key. Files still being written are skipped.
    pub async fn list(&self) -> DrctlResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(DrctlError::io(format!("reading {}", dir.display()), e));
                }
            };

            while let Some(item) = reader
                .next_entry()
                .await
                .map_err(|e| DrctlError::io(format!("reading {}", dir.display()), e))?
            {
                let path = item.path();
                let meta = item
                    .metadata()
                    .await
                    .map_err(|e| DrctlError::io(format!("inspecting {}", path.display()), e))?;

                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.to_string_lossy().ends_with(TMP_SUFFIX) {
                    continue;
                }

                let key = path
                    .strip_prefix(&self.root)
                    .unwrap_or(&path)
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let modified = meta.modified().map(DateTime::<Utc>::from).map_err(|e| {
                    DrctlError::io(format!("reading mtime of {}", path.display()), e)
                })?;

                entries.push(CacheEntry {
                    key,
                    size: meta.len(),
                    modified,
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Build the kustomization into `dest`.
    ///
    /// Output goes to `<dest>.tmp` first and is renamed over `dest` only
    /// after it was synced, so `dest` always holds a complete build or its
    /// previous content. The temporary file never outlives this call.
    async fn fetch(&self, kustomization_dir: &Path, dest: &Path) -> DrctlResult<()> {
        info!("Fetching {}", dest.display());

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DrctlError::io(format!("creating {}", parent.display()), e))?;
        }

        let tmp = tmp_path(dest);
        let result = match self.build_into(kustomization_dir, &tmp).await {
            Ok(()) => fs::rename(&tmp, dest).await.map_err(|e| {
                DrctlError::io(
                    format!("renaming {} to {}", tmp.display(), dest.display()),
                    e,
                )
            }),
            Err(e) => Err(e),
        };

        remove_silently(&tmp).await;
        result
    }

    async fn build_into(&self, kustomization_dir: &Path, tmp: &Path) -> DrctlResult<()> {
        let mut file = fs::File::create(tmp)
            .await
            .map_err(|e| DrctlError::io(format!("creating {}", tmp.display()), e))?;

        // TODO: retry transient build failures (e.g. remote bases that fail to download)
        let cmd = Cmd::new("kustomize")
            .arg("build")
            .arg(kustomization_dir.display().to_string());
        let output = self.runner.run(&cmd).await?;

        file.write_all(&output)
            .await
            .map_err(|e| DrctlError::io(format!("writing {}", tmp.display()), e))?;
        file.sync_all()
            .await
            .map_err(|e| DrctlError::io(format!("syncing {}", tmp.display()), e))?;
        Ok(())
    }
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// An absent entry is infinitely old
fn is_stale(age: Option<Duration>, threshold: Duration) -> bool {
    age.map_or(true, |age| age > threshold)
}

/// Time since `path` was last modified, `None` if it does not exist
async fn entry_age(path: &Path) -> DrctlResult<Option<Duration>> {
    let meta = match fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DrctlError::io(format!("inspecting {}", path.display()), e)),
    };
    let mtime = meta
        .modified()
        .map_err(|e| DrctlError::io(format!("reading mtime of {}", path.display()), e))?;

    Ok(Some(
        SystemTime::now()
            .duration_since(mtime)
            .unwrap_or(Duration::ZERO),
    ))
}

async fn remove_silently(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            debug!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
