//! Resource manifest and build-time asset bundle
//!
//! The bundle is produced by the application's build pipeline: a table of
//! resource path -> content checksum plus the ordered list of shell files
//! that must be cached before the worker is usable.

pub mod key;

pub use key::{resource_key, resource_url, Origin, ROOT_KEY};

use crate::error::{ShellCacheError, ShellCacheResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Mapping of logical resource path to content checksum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest(BTreeMap<String, String>);

impl ResourceManifest {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Checksum recorded for a key
    pub fn checksum(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to the JSON object persisted in the manifest cache
    pub fn to_json(&self) -> ShellCacheResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    /// Parse a persisted manifest entry
    pub fn from_json(bytes: &[u8]) -> ShellCacheResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ShellCacheError::ManifestCorrupt(e.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceManifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build-time input: resource manifest plus the app shell list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBundle {
    /// Resource path -> checksum
    pub resources: ResourceManifest,

    /// Shell files fetched during install, in order
    #[serde(default)]
    pub core: Vec<String>,
}

impl AssetBundle {
    pub fn new(resources: ResourceManifest, core: Vec<String>) -> Self {
        Self { resources, core }
    }

    /// Load a bundle from the JSON file emitted by the build
    pub async fn from_file(path: &Path) -> ShellCacheResult<Self> {
        if !path.exists() {
            return Err(ShellCacheError::BundleNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ShellCacheError::io(format!("reading resource bundle {}", path.display()), e)
        })?;

        let bundle = Self::parse(&content).map_err(|e| ShellCacheError::BundleInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        bundle.warn_unlisted_core();
        Ok(bundle)
    }

    /// Parse a bundle from a JSON string
    pub fn parse(content: &str) -> ShellCacheResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Shell paths that have no manifest entry
    pub fn unlisted_core(&self) -> Vec<&str> {
        self.core
            .iter()
            .map(String::as_str)
            .filter(|path| !self.resources.contains(path))
            .collect()
    }

    fn warn_unlisted_core(&self) {
        for path in self.unlisted_core() {
            warn!("Shell file {} is not listed in the resource manifest", path);
        }
    }
}
