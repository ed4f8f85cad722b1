use thiserror::Error;

/// Errors that can occur during chunk storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No committed file matches the lookup key.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The persistence layer is not reachable or not initialized yet.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The payload exceeds the configured size limit.
    #[error("payload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    /// A chunk could not be read back while streaming a file.
    #[error("streaming error: {0}")]
    Streaming(String),

    /// The provided content hash is invalid.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    /// Any other failure reported by the backing store.
    #[error("storage backend error: {0}")]
    Backend(String),
}
