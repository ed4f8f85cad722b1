use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::video::{UploadResponse, VideoResponse};
use crate::pipeline::{self, FileRef};
use crate::state::AppState;
use crate::utils::filename::{content_type_for, stored_filename};

/// Multipart field that carries the video.
pub const VIDEO_FIELD: &str = "video";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Reject a request whose declared length already exceeds the cap, before
/// anything is written.
fn check_content_length(headers: &HeaderMap, max_upload_size: u64) -> Result<(), AppError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > max_upload_size.saturating_add(MULTIPART_OVERHEAD) => {
            Err(AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {max_upload_size} bytes"
            )))
        }
        _ => Ok(()),
    }
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation("Invalid video ID".into()))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Videos",
    operation_id = "uploadVideo",
    summary = "Upload a video",
    description = "Streams the `video` multipart field into chunked storage. The part's filename \
        becomes the lookup key; its content type is kept for downloads.",
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `video` file field"),
    responses(
        (status = 200, description = "Video stored", body = UploadResponse),
        (status = 400, description = "No file or malformed multipart (NO_FILE, VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Upload failed (INTERNAL_ERROR)", body = ErrorBody),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, multipart))]
pub async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let store = state.store.get()?;
    let max_size = state.config.storage.max_upload_size;
    check_content_length(&headers, max_size)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let filename = stored_filename(field.file_name());
        let content_type = content_type_for(field.content_type(), &filename);
        let source = field.map_err(AppError::from);

        let metadata =
            pipeline::upload(store, source, &filename, &content_type, max_size).await?;
        info!(file_id = %metadata.id, %filename, length = metadata.length, "Video uploaded");

        return Ok(Json(UploadResponse {
            message: "Video uploaded successfully".into(),
            file: metadata.filename.clone(),
            video: metadata.into(),
        }));
    }

    Err(AppError::NoFileSupplied)
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List stored videos",
    description = "Returns every committed video, newest first.",
    responses(
        (status = 200, description = "Video list", body = Vec<VideoResponse>),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_videos(
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoResponse>>, AppError> {
    let files = state.store.get()?.list().await?;
    Ok(Json(files.into_iter().map(VideoResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/videos/{filename}",
    tag = "Videos",
    operation_id = "streamVideo",
    summary = "Stream a video by filename",
    description = "Streams the most recently uploaded video with this filename. Supports a single \
        `Range` and ETag-based caching via If-None-Match.",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "Video content"),
        (status = 206, description = "Partial content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 416, description = "Range not satisfiable (RANGE_NOT_SATISFIABLE)", body = ErrorBody),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn stream_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let handle = pipeline::open(state.store.get()?, FileRef::Name(&filename)).await?;
    pipeline::respond(handle, &headers)
}

#[utoipa::path(
    get,
    path = "/videos/by-id/{id}",
    tag = "Videos",
    operation_id = "streamVideoById",
    summary = "Stream a video by ID",
    params(("id" = String, Path, description = "Video ID (UUID)")),
    responses(
        (status = 200, description = "Video content"),
        (status = 206, description = "Partial content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 416, description = "Range not satisfiable (RANGE_NOT_SATISFIABLE)", body = ErrorBody),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn stream_video_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let handle = pipeline::open(state.store.get()?, FileRef::Id(id)).await?;
    pipeline::respond(handle, &headers)
}

#[utoipa::path(
    delete,
    path = "/videos/by-id/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Hides the video, then removes its chunks and its metadata.",
    params(("id" = String, Path, description = "Video ID (UUID)")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    state.store.get()?.delete_all(id).await?;
    info!(file_id = %id, "Video deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/update/{id}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Replace a video",
    description = "Deletes the video and stores the uploaded `video` field in its place under a new \
        ID. The two steps are not atomic: if the new upload fails after the old video was deleted, \
        the request fails with PARTIAL_REPLACE_FAILURE and the old content is gone.",
    params(("id" = String, Path, description = "ID of the video to replace (UUID)")),
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `video` file field"),
    responses(
        (status = 200, description = "Video replaced", body = UploadResponse),
        (status = 400, description = "No file or malformed ID (NO_FILE, VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Replacement failed (PARTIAL_REPLACE_FAILURE)", body = ErrorBody),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, multipart))]
pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let id = parse_id(&id)?;
    let store = state.store.get()?;
    let max_size = state.config.storage.max_upload_size;
    check_content_length(&headers, max_size)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let filename = stored_filename(field.file_name());
        let content_type = content_type_for(field.content_type(), &filename);
        let source = field.map_err(AppError::from);

        let metadata =
            pipeline::replace(store, id, source, &filename, &content_type, max_size).await?;
        info!(old_id = %id, file_id = %metadata.id, %filename, "Video replaced");

        return Ok(Json(UploadResponse {
            message: "Video updated successfully".into(),
            file: metadata.filename.clone(),
            video: metadata.into(),
        }));
    }

    Err(AppError::NoFileSupplied)
}
