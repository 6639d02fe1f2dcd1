//! Content-addressed cache for synthesized audio
//!
//! Keys are derived from the text being spoken, so identical text always lands
//! on the same file. A hit requires both an in-memory entry (or a file left by
//! an earlier run) and the file still being on disk; deleting an artifact
//! through [`ContentCache::evict`] drops the entry as well.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use sha2::{Digest, Sha256};

use crate::Result;

/// File extension of synthesized artifacts (Ogg/Opus)
pub const ARTIFACT_EXTENSION: &str = "ogg";

/// Number of digest bytes kept in a key (128 bits)
const KEY_BYTES: usize = 16;

/// Content hash of a synthesized text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash the UTF-8 bytes of `text`
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(hex::encode(&digest[..KEY_BYTES]))
    }

    /// Lowercase hex form of the key
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps content keys to audio artifacts in a single directory
#[derive(Debug)]
pub struct ContentCache {
    dir: PathBuf,
    entries: RwLock<HashMap<CacheKey, PathBuf>>,
}

impl ContentCache {
    /// Create a cache rooted at `dir` (created lazily on first write)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Directory holding the artifacts
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic artifact path for `key`
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.{ARTIFACT_EXTENSION}"))
    }

    /// Look up an artifact that is still present on disk
    ///
    /// A stale entry (file removed behind the cache's back) is dropped. A file
    /// at the deterministic path with no entry, e.g. from a previous run, is
    /// adopted.
    pub async fn lookup(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = self.path_for(key);
        let present = tokio::fs::try_exists(&path).await.unwrap_or(false);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if present {
            entries.insert(key.clone(), path.clone());
            Some(path)
        } else {
            if entries.remove(key).is_some() {
                tracing::debug!(%key, "dropping stale cache entry");
            }
            None
        }
    }

    /// Record an artifact for `key`
    pub fn insert(&self, key: CacheKey, path: PathBuf) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, path);
    }

    /// Whether an entry is recorded for `key`, regardless of disk state
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no entries are recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete the artifact for `key` and forget the entry
    ///
    /// A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed
    pub async fn evict(&self, key: &CacheKey) -> Result<()> {
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(key);
        }

        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(%key, path = %path.display(), "evicted audio artifact");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
