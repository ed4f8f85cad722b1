use std::sync::Arc;

use bytes::Bytes;
use common::storage::{ChunkStore, FileMetadata};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::upload;

/// Replace the file `id` with the content of `source`.
///
/// The old file is deleted before the new one is uploaded, and the two
/// steps are not atomic: if the upload fails the old content is already
/// gone and [`AppError::PartialReplaceFailure`] is returned.
pub async fn replace<S>(
    store: Arc<dyn ChunkStore>,
    id: Uuid,
    source: S,
    filename: &str,
    content_type: &str,
    max_size: u64,
) -> Result<FileMetadata, AppError>
where
    S: Stream<Item = Result<Bytes, AppError>>,
{
    let old = store.find_by_id(id).await?;
    store.delete_all(old.id).await?;
    info!(old_id = %old.id, old_filename = %old.filename, "Deleted file for replacement");

    upload(store, source, filename, content_type, max_size)
        .await
        .map_err(|e| AppError::PartialReplaceFailure {
            old_id: old.id,
            detail: e.to_string(),
        })
}
