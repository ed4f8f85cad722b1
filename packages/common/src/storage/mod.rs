mod error;
mod hash;
#[cfg(test)]
mod memory;
mod model;
mod reader;
mod traits;
mod writer;

pub use error::StorageError;
pub use hash::ContentHash;
pub use model::{FileMetadata, PendingFile};
pub use reader::{ChunkStream, ReadHandle, open_read, open_read_by_id};
pub use traits::ChunkStore;
pub use writer::ChunkWriter;
