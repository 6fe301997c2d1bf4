//! Network boundary
//!
//! Requests and responses as seen by the worker, and the trait the worker
//! uses to reach the origin. Only transport failures are errors; an HTTP
//! error status is a successful fetch with `is_ok() == false`.

mod http;

pub use http::{HttpNetwork, DEFAULT_MAX_BODY_BYTES};

use crate::error::ShellCacheResult;
use async_trait::async_trait;

/// How a fetch should treat intermediate HTTP caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Normal HTTP cache semantics
    #[default]
    Default,
    /// Revalidate with the origin, ignoring any intermediate cache
    Reload,
}

/// An outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub cache_mode: CacheMode,
}

impl Request {
    /// A GET request with default cache semantics
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            cache_mode: CacheMode::Default,
        }
    }

    /// A GET request that bypasses intermediate caches
    pub fn reload(url: impl Into<String>) -> Self {
        Self {
            cache_mode: CacheMode::Reload,
            ..Self::get(url)
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// A response received from the network or replayed from a cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was served for
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers in received order
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Outbound network access used by the worker
#[async_trait]
pub trait Network: Send + Sync {
    /// Issue a request and return the response.
    ///
    /// Errors only on transport failure.
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response>;
}
