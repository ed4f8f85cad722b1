use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::{ChunkStore, ReadHandle, open_read, open_read_by_id};
use futures::TryStreamExt;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::range::{ByteRange, parse_range_header};

/// How a download addresses its file.
#[derive(Debug, Clone, Copy)]
pub enum FileRef<'a> {
    /// Newest committed file with this name.
    Name(&'a str),
    Id(Uuid),
}

/// Resolve a committed file, or `NotFound`.
pub async fn open(store: Arc<dyn ChunkStore>, file: FileRef<'_>) -> Result<ReadHandle, AppError> {
    let handle = match file {
        FileRef::Name(name) => open_read(store, name).await?,
        FileRef::Id(id) => open_read_by_id(store, id).await?,
    };
    Ok(handle)
}

/// Build a streaming response for `handle`, honouring `If-None-Match` and
/// a single `Range`.
///
/// Chunks are only read while the client polls the body. A chunk failure
/// after the headers went out is logged and ends the body early; the client
/// sees a truncated response.
pub fn respond(handle: ReadHandle, headers: &HeaderMap) -> Result<Response, AppError> {
    let meta = handle.metadata().clone();
    let etag_value = meta.sha256.etag();

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag_value)]).into_response());
    }

    // A stale validator means the client's partial copy is useless.
    let range_header = match headers.get(header::IF_RANGE).map(|v| v.to_str()) {
        Some(Ok(validator)) if validator != etag_value => None,
        _ => headers.get(header::RANGE).and_then(|v| v.to_str().ok()),
    };

    let (status, range) = match parse_range_header(range_header, meta.length) {
        ByteRange::Full => (StatusCode::OK, 0..meta.length),
        ByteRange::Partial(range) => (StatusCode::PARTIAL_CONTENT, range),
        ByteRange::Unsatisfiable => {
            return Err(AppError::RangeNotSatisfiable {
                length: meta.length,
            });
        }
    };

    let file_id = meta.id;
    let stream = handle
        .into_range_stream(range.clone())
        .inspect_err(move |e| error!(%file_id, error = %e, "Video stream aborted"));

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, &meta.content_type)
        .header(header::CONTENT_LENGTH, (range.end - range.start).to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ETAG, &etag_value);

    if status == StatusCode::PARTIAL_CONTENT {
        builder = builder.header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end - 1, meta.length),
        );
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
