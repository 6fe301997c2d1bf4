//! Test doubles for the worker ports

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::network::{Network, Request, Response};
use crate::storage::{Cache, CacheStorage};
use crate::worker::WorkerHost;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted network: serves registered bodies, 404 otherwise
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    calls: Mutex<Vec<Request>>,
    offline: AtomicBool,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.as_bytes().to_vec()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        self.calls.lock().unwrap().push(request.clone());
        if self.offline.load(Ordering::SeqCst) {
            return Err(ShellCacheError::network(&request.url, "network unreachable"));
        }

        let routes = self.routes.lock().unwrap();
        Ok(match routes.get(&request.url) {
            Some((status, body)) => Response::new(&request.url, *status, body.clone()),
            None => Response::new(&request.url, 404, "not found"),
        })
    }
}

/// Host that counts lifecycle calls
#[derive(Default)]
pub struct RecordingHost {
    skip_waiting: AtomicUsize,
    claims: AtomicUsize,
}

impl RecordingHost {
    pub fn skip_waiting_count(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

impl WorkerHost for RecordingHost {
    fn skip_waiting(&self) {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
    }

    fn claim_clients(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }
}

/// Storage whose writes to one cache always fail; everything else delegates
pub struct FaultyStorage {
    inner: Arc<dyn CacheStorage>,
    failing: String,
}

impl FaultyStorage {
    pub fn new(inner: Arc<dyn CacheStorage>, failing: &str) -> Self {
        Self {
            inner,
            failing: failing.to_string(),
        }
    }
}

#[async_trait]
impl CacheStorage for FaultyStorage {
    async fn open(&self, name: &str) -> ShellCacheResult<Arc<dyn Cache>> {
        let cache = self.inner.open(name).await?;
        if name == self.failing {
            Ok(Arc::new(FaultyCache { inner: cache }))
        } else {
            Ok(cache)
        }
    }

    async fn delete(&self, name: &str) -> ShellCacheResult<bool> {
        self.inner.delete(name).await
    }

    async fn has(&self, name: &str) -> ShellCacheResult<bool> {
        self.inner.has(name).await
    }

    async fn names(&self) -> ShellCacheResult<Vec<String>> {
        self.inner.names().await
    }
}

struct FaultyCache {
    inner: Arc<dyn Cache>,
}

#[async_trait]
impl Cache for FaultyCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, url: &str) -> ShellCacheResult<Option<Response>> {
        self.inner.lookup(url).await
    }

    async fn put(&self, _url: &str, _response: &Response) -> ShellCacheResult<()> {
        Err(ShellCacheError::storage(self.inner.name(), "disk full"))
    }

    async fn delete(&self, _url: &str) -> ShellCacheResult<bool> {
        Err(ShellCacheError::storage(self.inner.name(), "disk full"))
    }

    async fn keys(&self) -> ShellCacheResult<Vec<String>> {
        self.inner.keys().await
    }
}
