//! Offline cache worker implementation

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::manifest::{resource_key, resource_url, AssetBundle, Origin, ResourceManifest, ROOT_KEY};
use crate::network::{CacheMode, Network, Request, Response};
use crate::storage::{copy_entries, Cache, CacheStorage};
use crate::worker::{
    ActivateOutcome, CacheNames, ControlMessage, FetchOutcome, LifecycleHandler, MessageOutcome,
    ResponseSource, WorkerHost, MANIFEST_ENTRY,
};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State of the persisted manifest relative to the current bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PersistedManifest {
    /// Never activated, or caches were reset
    Missing,
    /// Matches the current bundle
    Current,
    /// From an earlier deploy; `changed` keys differ
    Outdated { changed: usize },
    /// Present but unreadable
    Corrupt,
}

/// Coverage of the current manifest by the content cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheReport {
    pub origin: String,
    /// Manifest keys with a cached entry
    pub cached: Vec<String>,
    /// Manifest keys without a cached entry
    pub missing: Vec<String>,
    /// Cached URLs that no manifest key maps to
    pub orphaned: Vec<String>,
    /// Shell files staged and not yet activated
    pub staged: usize,
    pub manifest: PersistedManifest,
}

impl CacheReport {
    pub fn total(&self) -> usize {
        self.cached.len() + self.missing.len()
    }
}

/// A failed member of an all-or-nothing fetch batch
struct BatchFailure {
    url: String,
    reason: String,
}

/// Caches the app shell and serves manifest resources offline.
///
/// Holds no mutable state: every phase works purely from the injected
/// bundle and ports, so repeated or abandoned runs are safe.
pub struct OfflineCacheWorker {
    origin: Origin,
    bundle: AssetBundle,
    names: CacheNames,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
}

impl OfflineCacheWorker {
    pub fn new(
        origin: Origin,
        bundle: AssetBundle,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Self {
        Self {
            origin,
            bundle,
            names: CacheNames::default(),
            storage,
            network,
            host,
        }
    }

    /// Use custom cache namespace names
    pub fn with_cache_names(mut self, names: CacheNames) -> Self {
        self.names = names;
        self
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn bundle(&self) -> &AssetBundle {
        &self.bundle
    }

    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    /// Fetch every path concurrently; fail the whole batch on the first
    /// transport error or non-2xx status.
    async fn fetch_batch<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a str>,
        mode: CacheMode,
    ) -> Result<Vec<(String, Response)>, BatchFailure> {
        let requests: Vec<Request> = paths
            .into_iter()
            .map(|path| {
                let url = resource_url(&self.origin, path);
                match mode {
                    CacheMode::Reload => Request::reload(url),
                    CacheMode::Default => Request::get(url),
                }
            })
            .collect();

        try_join_all(requests.iter().map(|request| async move {
            let response = self
                .network
                .fetch(request)
                .await
                .map_err(|e| BatchFailure {
                    url: request.url.clone(),
                    reason: e.to_string(),
                })?;
            if !response.is_ok() {
                return Err(BatchFailure {
                    url: request.url.clone(),
                    reason: format!("HTTP status {}", response.status),
                });
            }
            Ok((request.url.clone(), response))
        }))
        .await
    }

    async fn persist_manifest(&self, cache: &dyn Cache) -> ShellCacheResult<()> {
        let mut entry = Response::new(MANIFEST_ENTRY, 200, self.bundle.resources.to_json()?);
        entry
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        cache.put(MANIFEST_ENTRY, &entry).await
    }

    /// Activation steps. Any error leaves the caches in an unknown state.
    async fn reconcile(&self) -> ShellCacheResult<ActivateOutcome> {
        let content = self.storage.open(&self.names.content).await?;
        let temp = self.storage.open(&self.names.temp).await?;
        let manifest_cache = self.storage.open(&self.names.manifest).await?;

        let Some(persisted) = manifest_cache.lookup(MANIFEST_ENTRY).await? else {
            debug!("No prior manifest, rebuilding {}", self.names.content);
            self.storage.delete(&self.names.content).await?;
            let content = self.storage.open(&self.names.content).await?;
            let installed = copy_entries(temp.as_ref(), content.as_ref()).await?;
            self.storage.delete(&self.names.temp).await?;
            self.persist_manifest(manifest_cache.as_ref()).await?;
            return Ok(ActivateOutcome::ColdStart { installed });
        };

        let old = ResourceManifest::from_json(&persisted.body)?;
        let current = &self.bundle.resources;
        let mut retained = 0;
        let mut evicted = 0;

        for url in content.keys().await? {
            let unchanged = resource_key(&self.origin, &url).is_some_and(|key| {
                current
                    .checksum(&key)
                    .is_some_and(|sum| old.checksum(&key) == Some(sum))
            });

            if unchanged {
                retained += 1;
            } else {
                debug!("Evicting {}", url);
                content.delete(&url).await?;
                evicted += 1;
            }
        }

        let installed = copy_entries(temp.as_ref(), content.as_ref()).await?;
        self.storage.delete(&self.names.temp).await?;
        self.persist_manifest(manifest_cache.as_ref()).await?;

        Ok(ActivateOutcome::Upgraded {
            retained,
            evicted,
            installed,
        })
    }

    /// Best-effort removal of every cache after a failed activation
    async fn discard_caches(&self) {
        for name in self.names.all() {
            if let Err(e) = self.storage.delete(name).await {
                warn!("Failed to delete cache {}: {}", name, e);
            }
        }
    }

    /// Delete all three caches. Returns the names that existed.
    pub async fn clear(&self) -> ShellCacheResult<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.names.all() {
            if self.storage.delete(name).await? {
                deleted.push(name.to_string());
            }
        }
        Ok(deleted)
    }

    async fn cache_first(&self, request: &Request, cache_url: &str) -> ShellCacheResult<FetchOutcome> {
        let content = self.storage.open(&self.names.content).await?;
        if let Some(response) = content.lookup(cache_url).await? {
            debug!("Cache hit {}", cache_url);
            return Ok(FetchOutcome::Respond {
                response,
                source: ResponseSource::Cache,
            });
        }

        debug!("Cache miss {}", cache_url);
        let response = self.network.fetch(request).await?;
        if response.is_ok() {
            if let Err(e) = content.put(cache_url, &response).await {
                warn!("Failed to cache {}: {}", cache_url, e);
            }
        }

        Ok(FetchOutcome::Respond {
            response,
            source: ResponseSource::Network,
        })
    }

    async fn online_first(&self, request: &Request, cache_url: &str) -> ShellCacheResult<FetchOutcome> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    if let Err(e) = self.store_content(cache_url, &response).await {
                        warn!("Failed to cache {}: {}", cache_url, e);
                    }
                }
                Ok(FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(err) => {
                let cached = match self.lookup_content(cache_url).await {
                    Ok(cached) => cached,
                    Err(e) => {
                        warn!("Offline fallback lookup for {} failed: {}", cache_url, e);
                        None
                    }
                };

                match cached {
                    Some(response) => {
                        debug!("Network failed, serving cached {}", cache_url);
                        Ok(FetchOutcome::Respond {
                            response,
                            source: ResponseSource::OfflineFallback,
                        })
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn store_content(&self, url: &str, response: &Response) -> ShellCacheResult<()> {
        let content = self.storage.open(&self.names.content).await?;
        content.put(url, response).await
    }

    async fn lookup_content(&self, url: &str) -> ShellCacheResult<Option<Response>> {
        let content = self.storage.open(&self.names.content).await?;
        content.lookup(url).await
    }

    /// Manifest keys that already have an entry in the content cache
    async fn cached_keys(&self, content: &dyn Cache) -> ShellCacheResult<HashSet<String>> {
        Ok(content
            .keys()
            .await?
            .iter()
            .filter_map(|url| resource_key(&self.origin, url))
            .collect())
    }

    /// Fetch and cache every manifest resource not yet in the content cache.
    ///
    /// All-or-nothing: one failed fetch stores nothing. Returns the number of
    /// resources stored.
    pub async fn download_offline(&self) -> ShellCacheResult<usize> {
        let content = self.storage.open(&self.names.content).await?;
        let cached = self.cached_keys(content.as_ref()).await?;
        let missing: Vec<&str> = self
            .bundle
            .resources
            .keys()
            .filter(|key| !cached.contains(*key))
            .collect();

        if missing.is_empty() {
            info!("All {} resources already cached", self.bundle.resources.len());
            return Ok(0);
        }

        debug!("Downloading {} resources for offline use", missing.len());
        let fetched = self
            .fetch_batch(missing, CacheMode::Default)
            .await
            .map_err(|f| ShellCacheError::SyncFailed {
                url: f.url,
                reason: f.reason,
            })?;

        for (url, response) in &fetched {
            content.put(url, response).await?;
        }

        info!("Downloaded {} resources for offline use", fetched.len());
        Ok(fetched.len())
    }

    /// Report manifest coverage and persisted manifest state
    pub async fn report(&self) -> ShellCacheResult<CacheReport> {
        let urls = if self.storage.has(&self.names.content).await? {
            self.storage.open(&self.names.content).await?.keys().await?
        } else {
            Vec::new()
        };

        let mut cached_keys = HashSet::new();
        let mut orphaned = Vec::new();
        for url in urls {
            match resource_key(&self.origin, &url) {
                Some(key) if self.bundle.resources.contains(&key) => {
                    cached_keys.insert(key);
                }
                _ => orphaned.push(url),
            }
        }

        let (cached, missing): (Vec<String>, Vec<String>) = self
            .bundle
            .resources
            .keys()
            .map(str::to_string)
            .partition(|key| cached_keys.contains(key));

        let staged = if self.storage.has(&self.names.temp).await? {
            self.storage.open(&self.names.temp).await?.keys().await?.len()
        } else {
            0
        };

        Ok(CacheReport {
            origin: self.origin.to_string(),
            cached,
            missing,
            orphaned,
            staged,
            manifest: self.persisted_manifest().await?,
        })
    }

    async fn persisted_manifest(&self) -> ShellCacheResult<PersistedManifest> {
        if !self.storage.has(&self.names.manifest).await? {
            return Ok(PersistedManifest::Missing);
        }
        let cache = self.storage.open(&self.names.manifest).await?;
        let Some(entry) = cache.lookup(MANIFEST_ENTRY).await? else {
            return Ok(PersistedManifest::Missing);
        };
        let Ok(old) = ResourceManifest::from_json(&entry.body) else {
            return Ok(PersistedManifest::Corrupt);
        };

        let current = &self.bundle.resources;
        let changed = current
            .keys()
            .chain(old.keys().filter(|k| !current.contains(k)))
            .filter(|k| current.checksum(k) != old.checksum(k))
            .count();

        Ok(if changed == 0 {
            PersistedManifest::Current
        } else {
            PersistedManifest::Outdated { changed }
        })
    }
}

#[async_trait]
impl LifecycleHandler for OfflineCacheWorker {
    async fn on_install(&self) -> ShellCacheResult<usize> {
        self.host.skip_waiting();

        let temp = self.storage.open(&self.names.temp).await?;
        let fetched = self
            .fetch_batch(self.bundle.core.iter().map(String::as_str), CacheMode::Reload)
            .await
            .map_err(|f| ShellCacheError::InstallFailed {
                url: f.url,
                reason: f.reason,
            })?;

        for (url, response) in &fetched {
            temp.put(url, response).await?;
        }

        info!("Installed {} shell files into {}", fetched.len(), temp.name());
        Ok(fetched.len())
    }

    async fn on_activate(&self) -> ActivateOutcome {
        match self.reconcile().await {
            Ok(outcome) => {
                self.host.claim_clients();
                info!("Activated: {}", outcome);
                outcome
            }
            Err(e) => {
                error!("Failed to upgrade offline cache: {}", e);
                self.discard_caches().await;
                ActivateOutcome::Reset {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn on_fetch(&self, request: &Request) -> ShellCacheResult<FetchOutcome> {
        if !request.is_get() {
            return Ok(FetchOutcome::Passthrough);
        }

        let key = match resource_key(&self.origin, &request.url) {
            Some(key) if self.bundle.resources.contains(&key) => key,
            _ => {
                debug!("Passthrough {}", request.url);
                return Ok(FetchOutcome::Passthrough);
            }
        };

        let cache_url = resource_url(&self.origin, &key);
        if key == ROOT_KEY {
            self.online_first(request, &cache_url).await
        } else {
            self.cache_first(request, &cache_url).await
        }
    }

    async fn on_message(&self, data: &str) -> ShellCacheResult<MessageOutcome> {
        match ControlMessage::parse(data) {
            Some(ControlMessage::SkipWaiting) => {
                self.host.skip_waiting();
                Ok(MessageOutcome::SkippedWaiting)
            }
            Some(ControlMessage::DownloadOffline) => {
                let downloaded = self.download_offline().await?;
                Ok(MessageOutcome::Synced { downloaded })
            }
            None => {
                debug!("Ignoring message {:?}", data);
                Ok(MessageOutcome::Ignored)
            }
        }
    }
}
