//! Cache index data structures.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index file name
pub const INDEX_FILE: &str = "index.json";

/// Blob directory name, next to the index
pub const BLOB_DIR: &str = "blobs";

/// One cached transform result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryInfo {
    /// Source content hash (blake3 hex)
    pub source_hash: String,
    /// Blob file name holding the optimized output (blake3 hex of output)
    pub blob: String,
}

/// Index mapping source paths to cached outputs
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheIndex {
    /// Source path (relative to the images dir) -> entry
    pub entries: FxHashMap<String, CacheEntryInfo>,
    /// Index creation time (Unix timestamp in seconds)
    #[serde(default)]
    pub created_at: u64,
}

impl CacheIndex {
    /// Create a new index with current timestamp.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            created_at: current_timestamp(),
        }
    }
}

/// Get current Unix timestamp in seconds
fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_json_shape() {
        let mut index = CacheIndex::new();
        index.entries.insert(
            "logo.png".into(),
            CacheEntryInfo {
                source_hash: "aa".into(),
                blob: "bb".into(),
            },
        );
        let json = serde_json::to_string(&index).unwrap();
        assert!(json.contains(r#""logo.png":{"source_hash":"aa","blob":"bb"}"#));

        let parsed: CacheIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entries["logo.png"].blob, "bb");
    }
}
