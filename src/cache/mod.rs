//! Local cache of rendered kustomization bundles
//!
//! Bundles are plain files under the cache root, one per key. An entry's
//! mtime is its build time and the only freshness signal.
//!
//! # Freshness
//!
//! | Operation | Rebuilds when older than | Returns |
//! |-----------|--------------------------|---------|
//! | `refresh` | 12 hours | nothing (cache warming) |
//! | `get` | 48 hours | entry path |
//!
//! Missing entries are always built. Old entries are never evicted; they
//! are only rebuilt on access or removed with `clear`.
//!
//! # Atomicity
//!
//! Builds write to `<entry>.tmp`, sync it, then rename it over the entry.
//! Readers see either the previous bundle or the new one, never a partial
//! file. There is no locking: concurrent builders of the same key may both
//! build, and the last rename wins.

pub mod bundle;
pub mod entry;

pub use bundle::{BundleCache, FETCH_AFTER, REFRESH_AFTER};
pub use entry::{format_age, format_bytes, CacheEntry};
