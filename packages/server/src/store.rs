use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::FileStatus;
use common::storage::{ChunkStore, ContentHash, FileMetadata, PendingFile, StorageError};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::{video_chunk, video_file};

/// [`ChunkStore`] backed by the `video_file` and `video_chunk` tables.
#[derive(Clone)]
pub struct DbChunkStore {
    db: DatabaseConnection,
    chunk_size: usize,
}

impl DbChunkStore {
    pub fn new(db: DatabaseConnection, chunk_size: usize) -> Self {
        Self { db, chunk_size }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn remove(&self, files_id: Uuid) -> Result<(), StorageError> {
        video_chunk::Entity::delete_many()
            .filter(video_chunk::Column::FilesId.eq(files_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        video_file::Entity::delete_by_id(files_id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

fn db_err(err: DbErr) -> StorageError {
    match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StorageError::Unavailable(err.to_string()),
        _ => StorageError::Backend(err.to_string()),
    }
}

fn to_metadata(model: video_file::Model) -> Result<FileMetadata, StorageError> {
    let length = u64::try_from(model.length)
        .map_err(|_| StorageError::Backend(format!("file {} has a negative length", model.id)))?;
    let chunk_size = u32::try_from(model.chunk_size).map_err(|_| {
        StorageError::Backend(format!("file {} has a negative chunk size", model.id))
    })?;
    let sha256 = match model.sha256.as_deref() {
        Some(hex) => ContentHash::from_hex(hex)?,
        None => {
            return Err(StorageError::Backend(format!(
                "file {} is complete but has no content hash",
                model.id
            )));
        }
    };

    Ok(FileMetadata {
        id: model.id,
        filename: model.filename,
        length,
        content_type: model.content_type,
        upload_date: model.upload_date.unwrap_or(model.created_at),
        chunk_size,
        sha256,
    })
}

#[async_trait]
impl ChunkStore for DbChunkStore {
    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    async fn open_write(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PendingFile, StorageError> {
        let chunk_size = i32::try_from(self.chunk_size)
            .map_err(|_| StorageError::Backend("chunk size does not fit in i32".into()))?;
        let id = Uuid::now_v7();

        let model = video_file::ActiveModel {
            id: Set(id),
            filename: Set(filename.to_string()),
            length: Set(0),
            content_type: Set(content_type.to_string()),
            chunk_size: Set(chunk_size),
            status: Set(FileStatus::Pending),
            sha256: Set(None),
            upload_date: Set(None),
            created_at: Set(Utc::now()),
        };
        video_file::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PendingFile { id })
    }

    async fn write_chunk(
        &self,
        file: &PendingFile,
        n: u32,
        data: Bytes,
    ) -> Result<(), StorageError> {
        let n = i32::try_from(n)
            .map_err(|_| StorageError::Backend(format!("chunk index {n} out of range")))?;

        let chunk = video_chunk::ActiveModel {
            files_id: Set(file.id),
            n: Set(n),
            data: Set(data.to_vec()),
        };
        video_chunk::Entity::insert(chunk)
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn commit(
        &self,
        file: &PendingFile,
        length: u64,
        sha256: ContentHash,
    ) -> Result<FileMetadata, StorageError> {
        let length = i64::try_from(length)
            .map_err(|_| StorageError::Backend(format!("length {length} out of range")))?;

        let result = video_file::Entity::update_many()
            .col_expr(
                video_file::Column::Status,
                Expr::value(FileStatus::Complete),
            )
            .col_expr(video_file::Column::Length, Expr::value(length))
            .col_expr(video_file::Column::Sha256, Expr::value(sha256.to_hex()))
            .col_expr(video_file::Column::UploadDate, Expr::value(Utc::now()))
            .filter(video_file::Column::Id.eq(file.id))
            .filter(video_file::Column::Status.eq(FileStatus::Pending))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound(format!("pending file {}", file.id)));
        }

        self.find_by_id(file.id).await
    }

    async fn abort(&self, file: &PendingFile) -> Result<(), StorageError> {
        self.remove(file.id).await?;
        debug!(file_id = %file.id, "Removed pending file");
        Ok(())
    }

    async fn find_by_name(&self, filename: &str) -> Result<FileMetadata, StorageError> {
        let model = video_file::Entity::find()
            .filter(video_file::Column::Filename.eq(filename))
            .filter(video_file::Column::Status.eq(FileStatus::Complete))
            .order_by_desc(video_file::Column::UploadDate)
            .order_by_desc(video_file::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))?;

        to_metadata(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<FileMetadata, StorageError> {
        let model = video_file::Entity::find_by_id(id)
            .filter(video_file::Column::Status.eq(FileStatus::Complete))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        to_metadata(model)
    }

    async fn read_chunk(&self, files_id: Uuid, n: u32) -> Result<Bytes, StorageError> {
        let seq = i32::try_from(n)
            .map_err(|_| StorageError::Streaming(format!("chunk index {n} out of range")))?;

        let chunk = video_chunk::Entity::find_by_id((files_id, seq))
            .one(&self.db)
            .await
            .map_err(|e| StorageError::Streaming(e.to_string()))?
            .ok_or_else(|| StorageError::Streaming(format!("chunk {n} of {files_id} is missing")))?;

        Ok(Bytes::from(chunk.data))
    }

    async fn delete_all(&self, files_id: Uuid) -> Result<(), StorageError> {
        // Hide the record first so readers never see a file with missing chunks.
        let result = video_file::Entity::update_many()
            .col_expr(
                video_file::Column::Status,
                Expr::value(FileStatus::Deleting),
            )
            .filter(video_file::Column::Id.eq(files_id))
            .filter(video_file::Column::Status.eq(FileStatus::Complete))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound(files_id.to_string()));
        }

        self.remove(files_id).await?;
        debug!(file_id = %files_id, "Deleted file");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<FileMetadata>, StorageError> {
        let models = video_file::Entity::find()
            .filter(video_file::Column::Status.eq(FileStatus::Complete))
            .order_by_desc(video_file::Column::UploadDate)
            .order_by_desc(video_file::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id;
                to_metadata(model)
                    .inspect_err(|e| {
                        warn!(file_id = %id, error = %e, "Skipping unreadable file row")
                    })
                    .ok()
            })
            .collect())
    }

    async fn sweep_stale(&self, older_than: DateTime<Utc>) -> Result<u64, StorageError> {
        let stale: Vec<Uuid> = video_file::Entity::find()
            .select_only()
            .column(video_file::Column::Id)
            .filter(video_file::Column::Status.ne(FileStatus::Complete))
            .filter(video_file::Column::CreatedAt.lt(older_than))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        for id in &stale {
            self.remove(*id).await?;
        }

        if !stale.is_empty() {
            info!(count = stale.len(), "Removed stale uploads");
        }
        Ok(stale.len() as u64)
    }
}
