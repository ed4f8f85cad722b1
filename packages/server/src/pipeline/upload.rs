use std::pin::pin;
use std::sync::Arc;

use bytes::Bytes;
use common::storage::{ChunkStore, ChunkWriter, FileMetadata};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::AppError;

/// Stream `source` into a new file and commit it.
///
/// At most one chunk is buffered. On any failure (source error, chunk write
/// error, or more than `max_size` bytes) the pending file is aborted before
/// the error is returned, so nothing partial is ever visible.
pub async fn upload<S>(
    store: Arc<dyn ChunkStore>,
    source: S,
    filename: &str,
    content_type: &str,
    max_size: u64,
) -> Result<FileMetadata, AppError>
where
    S: Stream<Item = Result<Bytes, AppError>>,
{
    let mut writer = ChunkWriter::open(store, filename, content_type, max_size).await?;
    let mut source = pin!(source);

    while let Some(item) = source.next().await {
        let written = match item {
            Ok(data) => writer.write(&data).await.map_err(AppError::from),
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let file_id = writer.id();
            let received = writer.len();
            if let Err(abort_err) = writer.abort().await {
                warn!(%file_id, error = %abort_err, "Failed to abort upload");
            }
            debug!(%file_id, received, error = %e, "Upload aborted");
            return Err(e);
        }
    }

    Ok(writer.finish().await?)
}
