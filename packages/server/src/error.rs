use std::fmt;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use serde::Serialize;
use uuid::Uuid;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Video not found")]
    pub error: String,
    /// Machine-readable error code. One of: `NO_FILE`, `VALIDATION_ERROR`,
    /// `NOT_FOUND`, `PAYLOAD_TOO_LARGE`, `RANGE_NOT_SATISFIABLE`,
    /// `STORAGE_UNAVAILABLE`, `STREAMING_ERROR`, `PARTIAL_REPLACE_FAILURE`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Underlying cause, when there is one worth reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NoFileSupplied,
    NotFound(String),
    PayloadTooLarge(String),
    /// Contains the full length of the requested file.
    RangeNotSatisfiable {
        length: u64,
    },
    StorageUnavailable,
    Streaming(String),
    /// The old file was deleted but its replacement could not be stored.
    PartialReplaceFailure {
        old_id: Uuid,
        detail: String,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    code: "VALIDATION_ERROR",
                    details: None,
                },
            ),
            AppError::NoFileSupplied => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "No file uploaded".into(),
                    code: "NO_FILE",
                    details: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: msg,
                    code: "NOT_FOUND",
                    details: None,
                },
            ),
            AppError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    error: "File too large".into(),
                    code: "PAYLOAD_TOO_LARGE",
                    details: Some(detail),
                },
            ),
            AppError::RangeNotSatisfiable { length } => (
                StatusCode::RANGE_NOT_SATISFIABLE,
                ErrorBody {
                    error: "Requested range not satisfiable".into(),
                    code: "RANGE_NOT_SATISFIABLE",
                    details: Some(format!("File length is {length} bytes")),
                },
            ),
            AppError::StorageUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "Storage is not available yet".into(),
                    code: "STORAGE_UNAVAILABLE",
                    details: None,
                },
            ),
            AppError::Streaming(detail) => {
                tracing::error!("Streaming error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Error streaming video".into(),
                        code: "STREAMING_ERROR",
                        details: Some(detail),
                    },
                )
            }
            AppError::PartialReplaceFailure { old_id, detail } => {
                tracing::error!(%old_id, "Replace failed after deleting the old file: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: format!("Video {old_id} was deleted but the replacement failed"),
                        code: "PARTIAL_REPLACE_FAILURE",
                        details: Some(detail),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "An unexpected error occurred".into(),
                        code: "INTERNAL_ERROR",
                        details: Some(detail),
                    },
                )
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => f.write_str(msg),
            AppError::NoFileSupplied => f.write_str("no file supplied"),
            AppError::PayloadTooLarge(detail) => write!(f, "payload too large: {detail}"),
            AppError::RangeNotSatisfiable { length } => {
                write!(f, "range not satisfiable for length {length}")
            }
            AppError::StorageUnavailable => f.write_str("storage unavailable"),
            AppError::Streaming(detail) => write!(f, "streaming error: {detail}"),
            AppError::PartialReplaceFailure { old_id, detail } => {
                write!(f, "replace of {old_id} failed after delete: {detail}")
            }
            AppError::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let content_range = if let AppError::RangeNotSatisfiable { length } = &self {
            Some(format!("bytes */{length}"))
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(value) = content_range {
            (status, [(header::CONTENT_RANGE, value)], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("Video not found".into()),
            StorageError::Unavailable(detail) => {
                tracing::warn!("Storage unavailable: {detail}");
                AppError::StorageUnavailable
            }
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::PayloadTooLarge(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::Streaming(detail) => AppError::Streaming(detail),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::Validation(format!("Multipart error: {}", err.body_text()))
        }
    }
}
