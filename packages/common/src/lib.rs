pub mod config;
pub mod file_status;
pub mod retry;
pub mod storage;

pub use file_status::FileStatus;
