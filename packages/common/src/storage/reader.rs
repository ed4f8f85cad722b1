use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use uuid::Uuid;

use super::error::StorageError;
use super::model::FileMetadata;
use super::traits::ChunkStore;

/// Lazy, strictly ordered stream of file bytes, one item per chunk.
pub type ChunkStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// A resolved, committed file ready to be streamed.
pub struct ReadHandle {
    store: Arc<dyn ChunkStore>,
    metadata: FileMetadata,
}

/// Resolve the most recent committed file named `filename`.
pub async fn open_read(
    store: Arc<dyn ChunkStore>,
    filename: &str,
) -> Result<ReadHandle, StorageError> {
    let metadata = store.find_by_name(filename).await?;
    Ok(ReadHandle { store, metadata })
}

/// Resolve a committed file by id.
pub async fn open_read_by_id(
    store: Arc<dyn ChunkStore>,
    id: Uuid,
) -> Result<ReadHandle, StorageError> {
    let metadata = store.find_by_id(id).await?;
    Ok(ReadHandle { store, metadata })
}

impl ReadHandle {
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// Stream the whole file.
    pub fn into_stream(self) -> ChunkStream {
        let length = self.metadata.length;
        self.into_range_stream(0..length)
    }

    /// Stream the bytes in `range` (clamped to the file length).
    ///
    /// Chunks are fetched one at a time, only when the consumer polls for
    /// them; dropping the stream stops all further reads. The first error
    /// ends the stream.
    pub fn into_range_stream(self, range: Range<u64>) -> ChunkStream {
        let end = range.end.min(self.metadata.length);
        let start = range.start.min(end);
        if start == end {
            return stream::empty().boxed();
        }

        let chunk_size = u64::from(self.metadata.chunk_size);
        if chunk_size == 0 {
            let err = StorageError::Streaming(format!(
                "file {} has a zero chunk size",
                self.metadata.id
            ));
            return stream::once(async move { Err(err) }).boxed();
        }

        let cursor = ChunkCursor {
            store: self.store,
            metadata: self.metadata,
            chunk_size,
            next: start / chunk_size,
            last: (end - 1) / chunk_size,
            start,
            end,
        };

        stream::try_unfold(cursor, |mut cursor| async move {
            if cursor.next > cursor.last {
                return Ok(None);
            }
            let data = cursor.read_next().await?;
            Ok(Some((data, cursor)))
        })
        .boxed()
    }
}

struct ChunkCursor {
    store: Arc<dyn ChunkStore>,
    metadata: FileMetadata,
    chunk_size: u64,
    next: u64,
    last: u64,
    start: u64,
    end: u64,
}

impl ChunkCursor {
    async fn read_next(&mut self) -> Result<Bytes, StorageError> {
        let n = self.next;
        let id = self.metadata.id;

        let expected = self.metadata.chunk_len(n).ok_or_else(|| {
            StorageError::Streaming(format!("chunk {n} of {id} is out of range"))
        })?;
        let seq = u32::try_from(n)
            .map_err(|_| StorageError::Streaming(format!("chunk {n} of {id} is out of range")))?;

        let data = self
            .store
            .read_chunk(id, seq)
            .await
            .map_err(|e| match e {
                StorageError::Streaming(msg) => StorageError::Streaming(msg),
                other => StorageError::Streaming(other.to_string()),
            })?;

        if data.len() as u64 != expected {
            return Err(StorageError::Streaming(format!(
                "chunk {n} of {id} has {} bytes, expected {expected}",
                data.len()
            )));
        }

        let chunk_start = n * self.chunk_size;
        let lo = (self.start.max(chunk_start) - chunk_start) as usize;
        let hi = (self.end.min(chunk_start + expected) - chunk_start) as usize;

        self.next += 1;
        Ok(data.slice(lo..hi))
    }
}
