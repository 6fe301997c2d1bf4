//! Configuration schema for shellcache
//!
//! Configuration is stored at `~/.config/shellcache/config.toml`

use crate::network::DEFAULT_MAX_BODY_BYTES;
use crate::worker::CacheNames;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Worker inputs
    pub worker: WorkerConfig,

    /// Cache storage settings
    pub storage: StorageConfig,

    /// Network settings
    pub network: NetworkConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Application origin (scheme://host[:port])
    pub origin: String,

    /// Resource bundle JSON emitted by the build
    pub bundle: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            bundle: PathBuf::from("resources.json"),
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per cache
    pub dir: PathBuf,

    /// Cache requests are served from
    pub content_cache: String,

    /// Staging cache filled during install
    pub temp_cache: String,

    /// Cache holding the last applied manifest
    pub manifest_cache: String,
}

impl StorageConfig {
    pub fn cache_names(&self) -> CacheNames {
        CacheNames {
            content: self.content_cache.clone(),
            temp: self.temp_cache.clone(),
            manifest: self.manifest_cache.clone(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let names = CacheNames::default();
        Self {
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("shellcache")
                .join("caches"),
            content_cache: names.content,
            temp_cache: names.temp,
            manifest_cache: names.manifest,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Largest response body accepted, in bytes
    pub max_body_bytes: u64,

    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: concat!("shellcache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
