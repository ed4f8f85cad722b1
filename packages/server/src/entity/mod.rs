pub mod video_chunk;
pub mod video_file;
