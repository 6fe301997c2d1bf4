//! Worker construction from configuration

use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::manifest::{AssetBundle, Origin};
use crate::network::HttpNetwork;
use crate::storage::FsStorage;
use crate::worker::{LoggingHost, OfflineCacheWorker};
use std::sync::Arc;
use tracing::debug;

/// Build a worker backed by filesystem storage and HTTP
pub async fn create_worker(config: &Config) -> ShellCacheResult<OfflineCacheWorker> {
    let origin = Origin::parse(&config.worker.origin)?;
    let bundle = AssetBundle::from_file(&config.worker.bundle).await?;
    let storage = FsStorage::new(&config.storage.dir).await?;
    let network = HttpNetwork::new(
        config.network.max_body_bytes,
        config.network.user_agent.clone(),
    );

    debug!(
        "Worker for {} with {} resources, caches in {}",
        origin,
        bundle.resources.len(),
        storage.root().display()
    );

    Ok(OfflineCacheWorker::new(
        origin,
        bundle,
        Arc::new(storage),
        Arc::new(network),
        Arc::new(LoggingHost),
    )
    .with_cache_names(config.storage.cache_names()))
}
