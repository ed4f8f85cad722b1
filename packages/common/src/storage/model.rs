use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hash::ContentHash;

/// Descriptor of a committed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: Uuid,
    /// Lookup key for downloads. Not unique.
    pub filename: String,
    /// Total byte length; equals the sum of all chunk lengths.
    pub length: u64,
    pub content_type: String,
    pub upload_date: DateTime<Utc>,
    pub chunk_size: u32,
    pub sha256: ContentHash,
}

impl FileMetadata {
    /// Number of chunks the file is split into (`0` for an empty file).
    pub fn chunk_count(&self) -> u64 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.length.div_ceil(u64::from(self.chunk_size))
    }

    /// Expected byte length of chunk `n`, or `None` if `n` is out of range.
    pub fn chunk_len(&self, n: u64) -> Option<u64> {
        if n >= self.chunk_count() {
            return None;
        }
        let chunk_size = u64::from(self.chunk_size);
        Some(chunk_size.min(self.length - n * chunk_size))
    }
}

/// A file that has been opened for writing but not committed yet.
///
/// Not `Clone`: exactly one writer owns a pending file.
#[derive(Debug)]
pub struct PendingFile {
    pub id: Uuid,
}
