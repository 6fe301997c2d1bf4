//! In-process cache storage

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::network::Response;
use crate::storage::{validate_cache_name, Cache, CacheStorage};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Cache storage that lives in memory for the lifetime of the process
#[derive(Default)]
pub struct MemoryStorage {
    caches: RwLock<HashMap<String, Arc<MemoryCache>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(name: &str) -> ShellCacheError {
    ShellCacheError::storage(name, "lock poisoned")
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> ShellCacheResult<Arc<dyn Cache>> {
        validate_cache_name(name)?;
        let mut caches = self.caches.write().map_err(|_| poisoned(name))?;
        let cache = caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCache::new(name)));
        Ok(Arc::clone(cache) as Arc<dyn Cache>)
    }

    async fn delete(&self, name: &str) -> ShellCacheResult<bool> {
        let mut caches = self.caches.write().map_err(|_| poisoned(name))?;
        Ok(caches.remove(name).is_some())
    }

    async fn has(&self, name: &str) -> ShellCacheResult<bool> {
        let caches = self.caches.read().map_err(|_| poisoned(name))?;
        Ok(caches.contains_key(name))
    }

    async fn names(&self) -> ShellCacheResult<Vec<String>> {
        let caches = self.caches.read().map_err(|_| poisoned("*"))?;
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// A single in-memory cache
pub struct MemoryCache {
    name: String,
    entries: RwLock<BTreeMap<String, Response>>,
}

impl MemoryCache {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, url: &str) -> ShellCacheResult<Option<Response>> {
        let entries = self.entries.read().map_err(|_| poisoned(&self.name))?;
        Ok(entries.get(url).cloned())
    }

    async fn put(&self, url: &str, response: &Response) -> ShellCacheResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned(&self.name))?;
        entries.insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn delete(&self, url: &str) -> ShellCacheResult<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned(&self.name))?;
        Ok(entries.remove(url).is_some())
    }

    async fn keys(&self) -> ShellCacheResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned(&self.name))?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_is_idempotent() {
        let storage = MemoryStorage::new();
        let a = storage.open("app-cache").await.unwrap();
        a.put("u", &Response::new("u", 200, "x")).await.unwrap();

        let b = storage.open("app-cache").await.unwrap();
        assert!(b.lookup("u").await.unwrap().is_some());
        assert_eq!(storage.names().await.unwrap(), vec!["app-cache"]);
    }

    #[tokio::test]
    async fn delete_drops_entries() {
        let storage = MemoryStorage::new();
        let cache = storage.open("app-cache").await.unwrap();
        cache.put("u", &Response::new("u", 200, "x")).await.unwrap();

        assert!(storage.delete("app-cache").await.unwrap());
        assert!(!storage.has("app-cache").await.unwrap());
        assert!(!storage.delete("app-cache").await.unwrap());

        let reopened = storage.open("app-cache").await.unwrap();
        assert!(reopened.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entry_delete_reports_presence() {
        let storage = MemoryStorage::new();
        let cache = storage.open("c").await.unwrap();
        cache.put("u", &Response::new("u", 200, "x")).await.unwrap();
        assert!(cache.delete("u").await.unwrap());
        assert!(!cache.delete("u").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_bad_names() {
        let storage = MemoryStorage::new();
        assert!(storage.open("../x").await.is_err());
    }
}
