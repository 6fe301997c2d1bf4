//! Filesystem cache storage
//!
//! Layout: `<root>/<cache name>/<hash>.entry`, where `<hash>` is the first
//! 16 bytes of the SHA-256 of the entry URL in hex. An entry file is one
//! line of JSON metadata followed by the raw body. Writes go to a unique
//! temp file and are renamed into place, so readers never see a partial
//! entry.

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::network::Response;
use crate::storage::{validate_cache_name, Cache, CacheStorage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, warn};

const ENTRY_EXT: &str = "entry";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Metadata line stored ahead of each body
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    #[serde(default)]
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// Cache storage rooted at a directory
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create storage rooted at `root`, creating the directory
    pub async fn new(root: impl Into<PathBuf>) -> ShellCacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            ShellCacheError::io(format!("creating cache root {}", root.display()), e)
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> ShellCacheResult<PathBuf> {
        validate_cache_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl CacheStorage for FsStorage {
    async fn open(&self, name: &str) -> ShellCacheResult<Arc<dyn Cache>> {
        let dir = self.cache_dir(name)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ShellCacheError::io(format!("creating cache {}", dir.display()), e))?;
        Ok(Arc::new(FsCache {
            name: name.to_string(),
            dir,
        }))
    }

    async fn delete(&self, name: &str) -> ShellCacheResult<bool> {
        let dir = self.cache_dir(name)?;
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| ShellCacheError::io(format!("deleting cache {}", dir.display()), e))?;
        debug!("Deleted cache {}", name);
        Ok(true)
    }

    async fn has(&self, name: &str) -> ShellCacheResult<bool> {
        Ok(self.cache_dir(name)?.is_dir())
    }

    async fn names(&self) -> ShellCacheResult<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            ShellCacheError::io(format!("listing caches in {}", self.root.display()), e)
        })?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ShellCacheError::io("reading cache root entry", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                if validate_cache_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

/// A cache directory
pub struct FsCache {
    name: String,
    dir: PathBuf,
}

impl FsCache {
    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir
            .join(format!("{}.{}", hex::encode(&digest[..16]), ENTRY_EXT))
    }

    fn err(&self, reason: impl ToString) -> ShellCacheError {
        ShellCacheError::storage(&self.name, reason)
    }

    /// Read the metadata line of an entry, leaving the reader at the body
    async fn read_meta(
        &self,
        path: &Path,
    ) -> ShellCacheResult<Option<(EntryMeta, BufReader<fs::File>)>> {
        let file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ShellCacheError::io(format!("opening {}", path.display()), e)),
        };

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|e| ShellCacheError::io(format!("reading {}", path.display()), e))?;

        let meta: EntryMeta = serde_json::from_slice(&line)
            .map_err(|e| self.err(format!("corrupt entry {}: {}", path.display(), e)))?;
        Ok(Some((meta, reader)))
    }
}

#[async_trait]
impl Cache for FsCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, url: &str) -> ShellCacheResult<Option<Response>> {
        let path = self.entry_path(url);
        let Some((meta, mut reader)) = self.read_meta(&path).await? else {
            return Ok(None);
        };
        if meta.url != url {
            warn!("Hash collision in cache {}: {} vs {}", self.name, meta.url, url);
            return Ok(None);
        }

        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .await
            .map_err(|e| ShellCacheError::io(format!("reading {}", path.display()), e))?;

        Ok(Some(Response {
            url: meta.url,
            status: meta.status,
            headers: meta.headers,
            body,
        }))
    }

    async fn put(&self, url: &str, response: &Response) -> ShellCacheResult<()> {
        if !self.dir.is_dir() {
            return Err(self.err("cache was deleted"));
        }

        let meta = EntryMeta {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            stored_at: Utc::now(),
        };
        let mut contents = serde_json::to_vec(&meta)?;
        contents.push(b'\n');
        contents.extend_from_slice(&response.body);

        let path = self.entry_path(url);
        let tmp = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&tmp, &contents)
            .await
            .map_err(|e| ShellCacheError::io(format!("writing {}", tmp.display()), e))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ShellCacheError::io(format!("renaming {}", path.display()), e));
        }
        Ok(())
    }

    async fn delete(&self, url: &str) -> ShellCacheResult<bool> {
        let path = self.entry_path(url);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ShellCacheError::io(format!("removing {}", path.display()), e)),
        }
    }

    async fn keys(&self) -> ShellCacheResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(urls),
            Err(e) => {
                return Err(ShellCacheError::io(
                    format!("listing {}", self.dir.display()),
                    e,
                ))
            }
        };

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ShellCacheError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
                continue;
            }
            if let Some((meta, _)) = self.read_meta(&path).await? {
                urls.push(meta.url);
            }
        }

        urls.sort();
        Ok(urls)
    }
}
