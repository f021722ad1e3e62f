//! File-based blob storage in a single flat directory

use crate::error::{CacheError, Result};
use crate::types::ResourceKey;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// Distinguishes temporary files of concurrent writes within this process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A directory of `<key>.jpg` blobs
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where entries are stored
    cache_dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `cache_dir`. Nothing touches the disk until [`init`](Self::init).
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure the cache directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;
        info!(cache_dir = ?self.cache_dir, "Cache initialized");
        Ok(())
    }

    /// Path of the entry for `key`
    pub fn path_for(&self, key: &ResourceKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Read an entry. `Ok(None)` means the entry does not exist.
    pub async fn get(&self, key: &ResourceKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)).await {
            Ok(data) => {
                debug!(key = %key, size = data.len(), "Cache hit");
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store an entry, replacing whatever was there before.
    ///
    /// The data goes to a hidden temporary file in the cache directory first
    /// and is then renamed over the entry, so the entry is only ever absent,
    /// old or complete.
    pub async fn put(&self, key: &ResourceKey, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(CacheError::EmptyEntry);
        }

        let path = self.path_for(key);
        let temp_path = self.temp_path_for(key);

        if let Err(e) = fs::write(&temp_path, data).await {
            discard_temp(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            discard_temp(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = data.len(), "Stored entry");
        Ok(())
    }

    /// Remove an entry. Returns `false` if there was nothing to remove.
    pub async fn remove(&self, key: &ResourceKey) -> Result<bool> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(key = %key, "Removed entry");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path_for(&self, key: &ResourceKey) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.cache_dir.join(format!(
            ".{}.{}.{}.tmp",
            key.file_name(),
            std::process::id(),
            seq
        ))
    }
}

async fn discard_temp(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = ?path, error = %e, "Failed to remove temporary file");
        }
    }
}
