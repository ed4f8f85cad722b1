use serde::Deserialize;

/// Default chunk size: 255 KiB, small enough that a chunk row stays well
/// below common database packet limits.
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Default upload cap: 2 GiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Chunk storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Maximum size of a single chunk in bytes. Default: 255 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Hard cap on the size of one uploaded file in bytes. Default: 2 GiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Pending uploads older than this many seconds are removed at startup.
    /// Default: 3600.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_max_upload_size() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE
}
fn default_stale_after_secs() -> u64 {
    3600
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_upload_size: default_max_upload_size(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}
