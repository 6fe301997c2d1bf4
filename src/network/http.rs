//! HTTP network backend built on ureq
//!
//! ureq is blocking, so each request runs on tokio's blocking pool.

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::network::{CacheMode, Network, Request, Response};
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// Default cap on a single response body
pub const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Network backend that talks to the origin over HTTP(S)
#[derive(Clone)]
pub struct HttpNetwork {
    agent: Agent,
    max_body_bytes: u64,
    user_agent: String,
}

impl HttpNetwork {
    /// Create a backend with the given body cap and user agent
    pub fn new(max_body_bytes: u64, user_agent: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();

        Self {
            agent: Agent::new_with_config(config),
            max_body_bytes,
            user_agent: user_agent.into(),
        }
    }

    fn fetch_blocking(&self, request: &Request) -> ShellCacheResult<Response> {
        let url = request.url.as_str();
        let mut builder = self.agent.get(url).header("User-Agent", &self.user_agent);
        if request.cache_mode == CacheMode::Reload {
            builder = builder
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }

        let mut res = builder
            .call()
            .map_err(|e| ShellCacheError::network(url, e))?;

        let status = res.status().as_u16();
        let headers = res
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = res
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
            .map_err(|e| ShellCacheError::network(url, e))?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(Response {
            url: request.url.clone(),
            status,
            headers,
            body,
        })
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_BODY_BYTES,
            concat!("shellcache/", env!("CARGO_PKG_VERSION")),
        )
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        if !request.is_get() {
            return Err(ShellCacheError::UnsupportedMethod {
                method: request.method.clone(),
                url: request.url.clone(),
            });
        }

        let this = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || this.fetch_blocking(&request))
            .await
            .map_err(|e| ShellCacheError::Internal(format!("fetch task failed: {}", e)))?
    }
}
