//! In-process chunk store used by the unit tests of this crate.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::StorageError;
use super::hash::ContentHash;
use super::model::{FileMetadata, PendingFile};
use super::traits::ChunkStore;
use crate::FileStatus;

struct Entry {
    status: FileStatus,
    created_at: DateTime<Utc>,
    metadata: FileMetadata,
}

#[derive(Default)]
struct Inner {
    files: HashMap<Uuid, Entry>,
    chunks: BTreeMap<(Uuid, u32), Bytes>,
    fail_writes_from: Option<u32>,
    chunk_reads: usize,
}

pub(crate) struct MemoryChunkStore {
    chunk_size: usize,
    inner: Mutex<Inner>,
}

impl MemoryChunkStore {
    pub(crate) fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Make every write of chunk `n` or later fail.
    pub(crate) fn fail_writes_from(&self, n: u32) {
        self.inner.lock().unwrap().fail_writes_from = Some(n);
    }

    pub(crate) fn chunks_of(&self, id: Uuid) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .chunks
            .range((id, 0)..=(id, u32::MAX))
            .map(|(_, data)| data.to_vec())
            .collect()
    }

    /// Overwrite a stored chunk, e.g. to simulate corruption.
    pub(crate) fn replace_chunk(&self, id: Uuid, n: u32, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.chunks.insert((id, n), Bytes::copy_from_slice(data));
    }

    pub(crate) fn remove_chunk(&self, id: Uuid, n: u32) {
        self.inner.lock().unwrap().chunks.remove(&(id, n));
    }

    /// Number of `read_chunk` calls served so far.
    pub(crate) fn chunk_reads(&self) -> usize {
        self.inner.lock().unwrap().chunk_reads
    }

    pub(crate) fn file_count(&self) -> usize {
        self.inner.lock().unwrap().files.len()
    }

    fn committed(inner: &Inner, id: &Uuid) -> Option<FileMetadata> {
        inner
            .files
            .get(id)
            .filter(|e| e.status == FileStatus::Complete)
            .map(|e| e.metadata.clone())
    }

    fn remove(inner: &mut Inner, id: Uuid) {
        inner.chunks.retain(|(files_id, _), _| *files_id != id);
        inner.files.remove(&id);
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    async fn open_write(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PendingFile, StorageError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let chunk_size = self.chunk_size as u32;
        let metadata = FileMetadata {
            id,
            filename: filename.to_string(),
            length: 0,
            content_type: content_type.to_string(),
            upload_date: now,
            chunk_size,
            sha256: ContentHash::compute(b""),
        };
        self.inner.lock().unwrap().files.insert(
            id,
            Entry {
                status: FileStatus::Pending,
                created_at: now,
                metadata,
            },
        );

        Ok(PendingFile { id })
    }

    async fn write_chunk(
        &self,
        file: &PendingFile,
        n: u32,
        data: Bytes,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes_from.is_some_and(|from| n >= from) {
            return Err(StorageError::Backend(format!("injected failure on chunk {n}")));
        }
        inner.chunks.insert((file.id, n), data);
        Ok(())
    }

    async fn commit(
        &self,
        file: &PendingFile,
        length: u64,
        sha256: ContentHash,
    ) -> Result<FileMetadata, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .files
            .get_mut(&file.id)
            .filter(|e| e.status == FileStatus::Pending)
            .ok_or_else(|| StorageError::NotFound(file.id.to_string()))?;

        entry.status = FileStatus::Complete;
        entry.metadata.length = length;
        entry.metadata.sha256 = sha256;
        entry.metadata.upload_date = Utc::now();
        Ok(entry.metadata.clone())
    }

    async fn abort(&self, file: &PendingFile) -> Result<(), StorageError> {
        Self::remove(&mut self.inner.lock().unwrap(), file.id);
        Ok(())
    }

    async fn find_by_name(&self, filename: &str) -> Result<FileMetadata, StorageError> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .values()
            .filter(|e| e.status == FileStatus::Complete && e.metadata.filename == filename)
            .max_by_key(|e| (e.metadata.upload_date, e.metadata.id))
            .map(|e| e.metadata.clone())
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<FileMetadata, StorageError> {
        let inner = self.inner.lock().unwrap();
        Self::committed(&inner, &id).ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn read_chunk(&self, files_id: Uuid, n: u32) -> Result<Bytes, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.chunk_reads += 1;
        inner
            .chunks
            .get(&(files_id, n))
            .cloned()
            .ok_or_else(|| StorageError::Streaming(format!("chunk {n} of {files_id} is missing")))
    }

    async fn delete_all(&self, files_id: Uuid) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.files.contains_key(&files_id) {
            return Err(StorageError::NotFound(files_id.to_string()));
        }
        Self::remove(&mut inner, files_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<FileMetadata>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut files: Vec<_> = inner
            .files
            .values()
            .filter(|e| e.status == FileStatus::Complete)
            .map(|e| e.metadata.clone())
            .collect();
        files.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(files)
    }

    async fn sweep_stale(&self, older_than: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let stale: Vec<Uuid> = inner
            .files
            .iter()
            .filter(|(_, e)| e.status != FileStatus::Complete && e.created_at < older_than)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            Self::remove(&mut inner, *id);
        }
        Ok(stale.len() as u64)
    }
}
