//! Transform result cache for image optimization.
//!
//! Entries are keyed by source path and content hash. A changed source
//! replaces its entry. The cache is shared by all tasks, written only by the
//! images task, and cleared in full by Clean.
//!
//! ```text
//! .assetflow/cache/images/
//! ├── index.json          # path -> { source_hash, blob }
//! └── blobs/<hash>        # optimized bytes
//! ```
//!
//! Blobs no index entry references are removed on persist.

mod hash;
mod index;

pub use hash::ContentHash;

use dashmap::DashMap;
use index::{BLOB_DIR, CacheEntryInfo, CacheIndex, INDEX_FILE};
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Subdirectory of the cache root used by the image step.
pub const IMAGE_CACHE_DIR: &str = "images";

#[derive(Debug, Clone)]
struct CacheEntry {
    source_hash: ContentHash,
    output: Arc<Vec<u8>>,
}

/// Process-wide memoization of optimized images.
#[derive(Debug, Default)]
pub struct TransformCache {
    /// Persistence directory (`None` = memory only)
    dir: Option<PathBuf>,
    entries: DashMap<PathBuf, CacheEntry>,
    dirty: AtomicBool,
}

impl TransformCache {
    /// Open a persistent cache, loading any previous index.
    ///
    /// A missing or unreadable index starts empty.
    pub fn open(dir: &Path) -> Self {
        let cache = Self {
            dir: Some(dir.to_path_buf()),
            ..Self::default()
        };

        let Ok(content) = fs::read_to_string(dir.join(INDEX_FILE)) else {
            return cache;
        };
        let Ok(index) = serde_json::from_str::<CacheIndex>(&content) else {
            crate::debug!("cache"; "discarding unreadable index in {}", dir.display());
            return cache;
        };

        let blobs = dir.join(BLOB_DIR);
        for (path, info) in index.entries {
            let Some(source_hash) = ContentHash::from_hex(&info.source_hash) else {
                continue;
            };
            if let Ok(output) = fs::read(blobs.join(&info.blob)) {
                cache.entries.insert(
                    PathBuf::from(path),
                    CacheEntry {
                        source_hash,
                        output: Arc::new(output),
                    },
                );
            }
        }
        crate::debug!("cache"; "loaded {} entries", cache.entries.len());
        cache
    }

    /// Look up the output for `key` if its source hash still matches.
    pub fn get(&self, key: &Path, source_hash: ContentHash) -> Option<Arc<Vec<u8>>> {
        self.entries
            .get(key)
            .filter(|entry| entry.source_hash == source_hash)
            .map(|entry| Arc::clone(&entry.output))
    }

    /// Store an optimized output.
    pub fn insert(&self, key: PathBuf, source_hash: ContentHash, output: Vec<u8>) {
        self.entries.insert(
            key,
            CacheEntry {
                source_hash,
                output: Arc::new(output),
            },
        );
        self.dirty.store(true, Ordering::Release);
    }

    /// Write the index and blobs if anything changed since the last persist.
    pub fn persist(&self) -> io::Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let blobs = dir.join(BLOB_DIR);
        fs::create_dir_all(&blobs)?;

        let mut index = CacheIndex::new();
        let mut live = FxHashSet::default();
        for entry in self.entries.iter() {
            let blob = ContentHash::of(&entry.output).to_hex();
            let blob_path = blobs.join(&blob);
            if !blob_path.exists() {
                fs::write(&blob_path, entry.output.as_slice())?;
            }
            live.insert(blob.clone());
            index.entries.insert(
                entry.key().to_string_lossy().replace('\\', "/"),
                CacheEntryInfo {
                    source_hash: entry.source_hash.to_hex(),
                    blob,
                },
            );
        }

        let json = serde_json::to_string_pretty(&index).map_err(io::Error::other)?;
        fs::write(dir.join(INDEX_FILE), json)?;

        for blob in fs::read_dir(&blobs)? {
            let blob = blob?;
            if !live.contains(&*blob.file_name().to_string_lossy()) {
                fs::remove_file(blob.path())?;
            }
        }
        Ok(())
    }

    /// Drop every entry, in memory and on disk.
    pub fn clear(&self) -> io::Result<()> {
        self.entries.clear();
        self.dirty.store(false, Ordering::Release);
        if let Some(dir) = &self.dir
            && dir.exists()
        {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    /// Persistence directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

#[cfg(test)]
impl TransformCache {
    /// Memory-only cache.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_requires_matching_hash() {
        let cache = TransformCache::in_memory();
        let key = PathBuf::from("logo.png");
        cache.insert(key.clone(), ContentHash::of(b"v1"), b"small".to_vec());

        assert_eq!(
            cache.get(&key, ContentHash::of(b"v1")).as_deref(),
            Some(&b"small".to_vec())
        );
        assert!(cache.get(&key, ContentHash::of(b"v2")).is_none());
        assert!(cache.get(Path::new("other.png"), ContentHash::of(b"v1")).is_none());
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache/images");

        let cache = TransformCache::open(&cache_dir);
        assert!(cache.is_empty());
        cache.insert("a/b.jpg".into(), ContentHash::of(b"src"), b"out".to_vec());
        cache.persist().unwrap();
        assert!(cache_dir.join(INDEX_FILE).exists());

        let reopened = TransformCache::open(&cache_dir);
        assert_eq!(reopened.len(), 1);
        let hit = reopened.get(Path::new("a/b.jpg"), ContentHash::of(b"src"));
        assert_eq!(hit.as_deref(), Some(&b"out".to_vec()));
    }

    #[test]
    fn test_persist_prunes_orphan_blobs() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("images");
        let blobs = cache_dir.join(BLOB_DIR);

        let cache = TransformCache::open(&cache_dir);
        cache.insert("a.png".into(), ContentHash::of(b"v1"), b"first".to_vec());
        cache.persist().unwrap();
        let first = blobs.join(ContentHash::of(b"first").to_hex());
        assert!(first.exists());

        // the source changed during the session: its old blob is unreferenced
        cache.insert("a.png".into(), ContentHash::of(b"v2"), b"second".to_vec());
        fs::write(blobs.join("stray"), b"?").unwrap();
        cache.persist().unwrap();

        assert!(!first.exists());
        assert!(!blobs.join("stray").exists());
        assert!(blobs.join(ContentHash::of(b"second").to_hex()).exists());
        assert_eq!(fs::read_dir(&blobs).unwrap().count(), 1);
    }

    #[test]
    fn test_clear_removes_disk_state() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("images");

        let cache = TransformCache::open(&cache_dir);
        cache.insert("x.png".into(), ContentHash::of(b"x"), vec![1, 2, 3]);
        cache.persist().unwrap();

        cache.clear().unwrap();
        assert!(cache.is_empty());
        assert!(!cache_dir.exists());

        // Clearing twice is fine
        cache.clear().unwrap();
    }

    #[test]
    fn test_corrupt_index_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "{ not json").unwrap();
        assert!(TransformCache::open(dir.path()).is_empty());
    }
}
