use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::StorageError;
use super::hash::ContentHash;
use super::model::{FileMetadata, PendingFile};

/// Chunked file storage: each file is one metadata record plus an ordered
/// run of fixed-size chunks.
///
/// A file only becomes visible to `find_*` and `list` once `commit` succeeds.
/// Most callers should go through [`ChunkWriter`](super::ChunkWriter) and
/// [`open_read`](super::open_read) rather than the raw chunk operations.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Maximum chunk size in bytes used for newly written files.
    fn chunk_size(&self) -> usize;

    /// Allocate a new file id and record it as pending.
    async fn open_write(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PendingFile, StorageError>;

    /// Persist chunk `n` of a pending file.
    async fn write_chunk(&self, file: &PendingFile, n: u32, data: Bytes)
    -> Result<(), StorageError>;

    /// Make a pending file visible. Only call once every chunk is persisted.
    async fn commit(
        &self,
        file: &PendingFile,
        length: u64,
        sha256: ContentHash,
    ) -> Result<FileMetadata, StorageError>;

    /// Discard a pending file together with any chunks written so far.
    async fn abort(&self, file: &PendingFile) -> Result<(), StorageError>;

    /// Most recently uploaded committed file with the given name.
    async fn find_by_name(&self, filename: &str) -> Result<FileMetadata, StorageError>;

    /// Committed file by id.
    async fn find_by_id(&self, id: Uuid) -> Result<FileMetadata, StorageError>;

    /// Read chunk `n` of a file. Missing chunks are a streaming error.
    async fn read_chunk(&self, files_id: Uuid, n: u32) -> Result<Bytes, StorageError>;

    /// Remove a file: hide the record, delete its chunks, then the record.
    async fn delete_all(&self, files_id: Uuid) -> Result<(), StorageError>;

    /// All committed files, newest first.
    async fn list(&self) -> Result<Vec<FileMetadata>, StorageError>;

    /// Remove uncommitted or half-deleted files created before `older_than`.
    ///
    /// Returns the number of files removed.
    async fn sweep_stale(&self, older_than: DateTime<Utc>) -> Result<u64, StorageError>;
}
