use chrono::{DateTime, Utc};
use common::storage::FileMetadata;
use serde::Serialize;

/// Response DTO for a stored video.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    /// File ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    #[schema(example = "clip.mp4")]
    pub filename: String,
    /// Size in bytes.
    #[schema(example = 5242880)]
    pub length: u64,
    #[schema(example = "video/mp4")]
    pub content_type: String,
    pub upload_date: DateTime<Utc>,
    /// Chunk size the file was stored with.
    #[schema(example = 261120)]
    pub chunk_size: u32,
    /// Hex SHA-256 of the content. Also served as the download `ETag`.
    pub sha256: String,
}

impl From<FileMetadata> for VideoResponse {
    fn from(meta: FileMetadata) -> Self {
        Self {
            id: meta.id.to_string(),
            filename: meta.filename,
            length: meta.length,
            content_type: meta.content_type,
            upload_date: meta.upload_date,
            chunk_size: meta.chunk_size,
            sha256: meta.sha256.to_hex(),
        }
    }
}

/// Response DTO for upload and replace.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Video uploaded successfully")]
    pub message: String,
    /// Stored filename.
    #[schema(example = "clip.mp4")]
    pub file: String,
    pub video: VideoResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}
