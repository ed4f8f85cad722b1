use std::sync::Arc;

use bytes::BytesMut;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::StorageError;
use super::hash::ContentHasher;
use super::model::{FileMetadata, PendingFile};
use super::traits::ChunkStore;

/// Sequential write handle for a single file.
///
/// Bytes are buffered until a full chunk is available, so at most one chunk
/// is held in memory. The file stays invisible until [`finish`](Self::finish)
/// commits it. A writer dropped without `finish` or `abort` (for example when
/// the request future is cancelled) schedules its own cleanup on the current
/// Tokio runtime.
pub struct ChunkWriter {
    store: Arc<dyn ChunkStore>,
    file: Option<PendingFile>,
    id: Uuid,
    buffer: BytesMut,
    chunk_size: usize,
    next_n: u32,
    length: u64,
    max_size: u64,
    hasher: ContentHasher,
}

impl ChunkWriter {
    /// Open a new pending file. Writes beyond `max_size` bytes are rejected.
    pub async fn open(
        store: Arc<dyn ChunkStore>,
        filename: &str,
        content_type: &str,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let chunk_size = store.chunk_size();
        if chunk_size == 0 {
            return Err(StorageError::Backend("chunk size must be positive".into()));
        }

        let file = store.open_write(filename, content_type).await?;
        debug!(file_id = %file.id, filename, chunk_size, "Opened pending file");

        Ok(Self {
            store,
            id: file.id,
            file: Some(file),
            buffer: BytesMut::with_capacity(chunk_size),
            chunk_size,
            next_n: 0,
            length: 0,
            max_size,
            hasher: ContentHasher::default(),
        })
    }

    /// Id allocated for the file being written.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Bytes accepted so far.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Append bytes, persisting every chunk that fills up.
    ///
    /// On error the writer must be aborted; nothing has been committed.
    pub async fn write(&mut self, mut data: &[u8]) -> Result<(), StorageError> {
        let actual = self.length + data.len() as u64;
        if actual > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual,
                limit: self.max_size,
            });
        }

        self.hasher.update(data);
        self.length = actual;

        while !data.is_empty() {
            let take = (self.chunk_size - self.buffer.len()).min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() == self.chunk_size {
                self.flush_chunk().await?;
            }
        }

        Ok(())
    }

    /// Flush the trailing partial chunk and commit the file.
    ///
    /// If anything fails the pending file is aborted before the error is
    /// returned, so callers observe either a visible file or nothing.
    pub async fn finish(mut self) -> Result<FileMetadata, StorageError> {
        match self.commit_inner().await {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                if let Err(abort_err) = self.abort_inner().await {
                    warn!(file_id = %self.id, error = %abort_err, "Failed to clean up after commit error");
                }
                Err(e)
            }
        }
    }

    /// Discard the pending file and every chunk written so far.
    pub async fn abort(mut self) -> Result<(), StorageError> {
        self.abort_inner().await
    }

    async fn commit_inner(&mut self) -> Result<FileMetadata, StorageError> {
        if !self.buffer.is_empty() {
            self.flush_chunk().await?;
        }

        let sha256 = std::mem::take(&mut self.hasher).finish();
        let file = self.pending()?;
        let metadata = self.store.commit(file, self.length, sha256).await?;

        self.file = None;
        debug!(file_id = %metadata.id, length = metadata.length, chunks = self.next_n, "Committed file");
        Ok(metadata)
    }

    async fn abort_inner(&mut self) -> Result<(), StorageError> {
        match self.file.take() {
            Some(file) => {
                debug!(file_id = %file.id, chunks = self.next_n, "Aborting pending file");
                self.store.abort(&file).await
            }
            None => Ok(()),
        }
    }

    async fn flush_chunk(&mut self) -> Result<(), StorageError> {
        let n = self.next_n;
        let data = self.buffer.split().freeze();
        self.buffer.reserve(self.chunk_size);

        let file = self.pending()?;
        self.store.write_chunk(file, n, data).await?;

        self.next_n = n
            .checked_add(1)
            .ok_or_else(|| StorageError::Backend("chunk sequence overflow".into()))?;
        Ok(())
    }

    fn pending(&self) -> Result<&PendingFile, StorageError> {
        self.file
            .as_ref()
            .ok_or_else(|| StorageError::Backend("writer is already closed".into()))
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };

        let store = Arc::clone(&self.store);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = store.abort(&file).await {
                        warn!(file_id = %file.id, error = %e, "Failed to clean up abandoned upload");
                    }
                });
            }
            Err(_) => {
                warn!(file_id = %file.id, "Abandoned upload left for the stale sweep");
            }
        }
    }
}
