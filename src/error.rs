//! Error types for shellcache
//!
//! All modules use `ShellCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shellcache operations
pub type ShellCacheResult<T> = Result<T, ShellCacheError>;

/// All errors that can occur in shellcache
#[derive(Error, Debug)]
pub enum ShellCacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    // Build input errors
    #[error("Resource bundle not found: {0}")]
    BundleNotFound(PathBuf),

    #[error("Invalid resource bundle {path}: {reason}")]
    BundleInvalid { path: PathBuf, reason: String },

    // Storage errors
    #[error("Invalid cache name '{0}'")]
    InvalidCacheName(String),

    #[error("Cache storage error in {cache}: {reason}")]
    Storage { cache: String, reason: String },

    #[error("Persisted manifest is corrupt: {0}")]
    ManifestCorrupt(String),

    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Unsupported request method {method} for {url}")]
    UnsupportedMethod { method: String, url: String },

    // Batch errors
    #[error("Install failed fetching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Offline download failed fetching {url}: {reason}")]
    SyncFailed { url: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ShellCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error for a named cache
    pub fn storage(cache: impl Into<String>, reason: impl ToString) -> Self {
        Self::Storage {
            cache: cache.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error came from the network port
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::BundleNotFound(_) => {
                Some("Point worker.bundle at the resources JSON emitted by your build")
            }
            Self::InvalidOrigin { .. } => Some("Use scheme://host[:port], e.g. https://app.example.com"),
            Self::InstallFailed { .. } => Some("Check that the origin is reachable, then rerun: shellcache install"),
            Self::SyncFailed { .. } | Self::Network { .. } => {
                Some("Check network connectivity to the configured origin")
            }
            Self::ManifestCorrupt(_) => Some("Run: shellcache clear"),
            _ => None,
        }
    }
}
