//! Cache entry metadata and display helpers

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format an age as the largest whole unit (e.g., "3h", "2d")
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        s if s >= 86_400 => format!("{}d", s / 86_400),
        s if s >= 3_600 => format!("{}h", s / 3_600),
        s if s >= 60 => format!("{}m", s / 60),
        s => format!("{}s", s),
    }
}

/// A built artifact stored in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Key relative to the cache root, `/`-separated
    pub key: String,
    /// Size of the artifact in bytes
    pub size: u64,
    /// Last build time
    pub modified: DateTime<Utc>,
}

impl CacheEntry {
    /// Time since the entry was last built, zero if modified in the future
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.modified).to_std().unwrap_or(Duration::ZERO)
    }
}
