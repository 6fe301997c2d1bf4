//! Cache storage boundary
//!
//! A key-value blob store keyed by request URL and organized into named
//! caches. This is the only persistent state the worker has.
//!
//! Backends must make `put` and `delete` atomic per key: concurrent fetch
//! handlers share the content cache without any higher-level locking.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::network::Response;
use async_trait::async_trait;
use std::sync::Arc;

/// Named cache namespaces
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a cache, creating it if it does not exist
    async fn open(&self, name: &str) -> ShellCacheResult<Arc<dyn Cache>>;

    /// Delete a cache and all its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> ShellCacheResult<bool>;

    /// Whether a cache with this name exists
    async fn has(&self, name: &str) -> ShellCacheResult<bool>;

    /// Names of all existing caches, sorted
    async fn names(&self) -> ShellCacheResult<Vec<String>>;
}

/// A single named cache of URL -> response entries
#[async_trait]
pub trait Cache: Send + Sync {
    fn name(&self) -> &str;

    /// Stored response for a URL, if any
    async fn lookup(&self, url: &str) -> ShellCacheResult<Option<Response>>;

    /// Store a response under a URL, replacing any previous entry
    async fn put(&self, url: &str, response: &Response) -> ShellCacheResult<()>;

    /// Remove the entry for a URL. Returns whether it existed.
    async fn delete(&self, url: &str) -> ShellCacheResult<bool>;

    /// URLs of all stored entries
    async fn keys(&self) -> ShellCacheResult<Vec<String>>;
}

/// Validate a cache name for use as a namespace identifier.
///
/// Names become directory names in the filesystem backend, so only
/// `[A-Za-z0-9._-]` is allowed and `.`/`..` are rejected.
pub fn validate_cache_name(name: &str) -> ShellCacheResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(ShellCacheError::InvalidCacheName(name.to_string()))
    }
}

/// Copy every entry of `from` into `to`, overwriting. Returns the count.
pub async fn copy_entries(from: &dyn Cache, to: &dyn Cache) -> ShellCacheResult<usize> {
    let mut copied = 0;
    for url in from.keys().await? {
        if let Some(response) = from.lookup(&url).await? {
            to.put(&url, &response).await?;
            copied += 1;
        }
    }
    Ok(copied)
}
