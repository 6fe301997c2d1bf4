//! Origin handling and resource key derivation
//!
//! A resource key is the path of a request relative to the application
//! origin. Keys are what the manifest is indexed by; canonical URLs are
//! what the caches are indexed by.

use crate::error::{ShellCacheError, ShellCacheResult};
use std::fmt;

/// Sentinel key for the root document
pub const ROOT_KEY: &str = "/";

/// Query marker used by builds to cache-bust versioned assets
const VERSION_QUERY: &str = "?v=";

/// Normalized application origin (`scheme://host[:port]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Parse and normalize an origin string.
    ///
    /// A single trailing slash is accepted and dropped. Paths, queries and
    /// fragments are rejected.
    pub fn parse(s: &str) -> ShellCacheResult<Self> {
        let trimmed = s.trim();
        let invalid = |reason: &str| ShellCacheError::InvalidOrigin {
            origin: s.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid("scheme must be http or https"));
        }

        let authority = rest.strip_suffix('/').unwrap_or(rest);
        if authority.is_empty() {
            return Err(invalid("missing host"));
        }
        if authority.contains(['/', '?', '#']) {
            return Err(invalid("origin must not contain a path, query or fragment"));
        }

        Ok(Self(format!("{}://{}", scheme, authority.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the logical resource key for a request URL.
///
/// Returns `None` for URLs outside the origin. The `?v=` suffix is dropped,
/// and the origin itself, `origin/#...` and an empty remainder all map to
/// [`ROOT_KEY`]. Scheme and host compare case-insensitively.
pub fn resource_key(origin: &Origin, url: &str) -> Option<String> {
    let url = normalize_authority(url);
    let rest = url.strip_prefix(origin.as_str())?;
    if rest.is_empty() {
        return Some(ROOT_KEY.to_string());
    }
    let rest = rest.strip_prefix('/')?;
    if rest.starts_with('#') {
        return Some(ROOT_KEY.to_string());
    }

    let key = match rest.find(VERSION_QUERY) {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    if key.is_empty() {
        return Some(ROOT_KEY.to_string());
    }
    Some(key.to_string())
}

/// Lowercase the scheme and authority of a URL, leaving the path untouched
fn normalize_authority(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(end);
    format!(
        "{}://{}{}",
        scheme.to_ascii_lowercase(),
        authority.to_ascii_lowercase(),
        tail
    )
}

/// Canonical cache URL for a resource key
pub fn resource_url(origin: &Origin, key: &str) -> String {
    if key == ROOT_KEY {
        format!("{}/", origin)
    } else {
        format!("{}/{}", origin, key.trim_start_matches('/'))
    }
}
