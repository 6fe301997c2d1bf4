//! Offline resource cache worker
//!
//! One component with four lifecycle phases:
//!
//! | Phase | Trigger | Effect |
//! |-------|---------|--------|
//! | install | new worker version | shell files fetched into the temp cache |
//! | activate | old worker discarded | content cache reconciled against the prior manifest |
//! | fetch | every request | cache-first for assets, online-first for the root document |
//! | message | client page | `skipWaiting` or a full offline download |
//!
//! The runtime adapter that turns host events into these calls lives
//! outside this module (see the CLI for one).

mod host;
mod offline;
#[cfg(test)]
mod testing;

pub use host::{LoggingHost, WorkerHost};
pub use offline::{CacheReport, OfflineCacheWorker, PersistedManifest};

use crate::error::ShellCacheResult;
use crate::network::{Request, Response};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the single entry in the manifest cache
pub const MANIFEST_ENTRY: &str = "manifest";

/// Names of the three cache namespaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNames {
    /// Durable cache that requests are served from
    pub content: String,
    /// Staging area filled during install
    pub temp: String,
    /// Holds the last applied resource manifest
    pub manifest: String,
}

impl CacheNames {
    pub fn all(&self) -> [&str; 3] {
        [&self.content, &self.temp, &self.manifest]
    }
}

impl Default for CacheNames {
    fn default() -> Self {
        Self {
            content: "app-cache".to_string(),
            temp: "app-temp-cache".to_string(),
            manifest: "app-manifest".to_string(),
        }
    }
}

/// Result of an activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// No prior manifest: content cache rebuilt from the shell alone
    ColdStart { installed: usize },
    /// Prior manifest found: unchanged entries kept, the rest evicted
    Upgraded {
        retained: usize,
        evicted: usize,
        installed: usize,
    },
    /// Reconciliation failed and every cache was discarded
    Reset { reason: String },
}

impl fmt::Display for ActivateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColdStart { installed } => {
                write!(f, "cold start, {} shell files installed", installed)
            }
            Self::Upgraded {
                retained,
                evicted,
                installed,
            } => write!(
                f,
                "upgraded, {} retained, {} evicted, {} shell files installed",
                retained, evicted, installed
            ),
            Self::Reset { reason } => write!(f, "caches reset after failure: {}", reason),
        }
    }
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live response from the origin
    Network,
    /// Replayed from the content cache
    Cache,
    /// Network failed; cached copy of the root document served instead
    OfflineFallback,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Cache => write!(f, "cache"),
            Self::OfflineFallback => write!(f, "offline-fallback"),
        }
    }
}

/// Result of intercepting a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not handled; the host performs the request natively
    Passthrough,
    /// Handled by the worker
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

/// Control messages accepted from client pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    SkipWaiting,
    DownloadOffline,
}

impl ControlMessage {
    /// Parse a message payload. Only exact literals are recognized.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }
}

/// Result of handling a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    SkippedWaiting,
    Synced { downloaded: usize },
    Ignored,
}

/// One method per worker lifecycle phase
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    /// Precache the app shell. Fails if any shell file cannot be fetched.
    async fn on_install(&self) -> ShellCacheResult<usize>;

    /// Reconcile caches against the prior manifest. Never fails; on error
    /// every cache is discarded and [`ActivateOutcome::Reset`] is returned.
    async fn on_activate(&self) -> ActivateOutcome;

    /// Intercept a request
    async fn on_fetch(&self, request: &Request) -> ShellCacheResult<FetchOutcome>;

    /// Handle a control message from a client page
    async fn on_message(&self, data: &str) -> ShellCacheResult<MessageOutcome>;
}
