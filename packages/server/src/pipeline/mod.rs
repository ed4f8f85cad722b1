//! Transfer pipelines between HTTP bodies and the chunk store.
//!
//! Each pipeline is a single `async fn` that resolves to exactly one
//! `Result`, so a caller observes one terminal outcome per transfer.

pub mod download;
pub mod replace;
pub mod upload;

pub use download::{FileRef, open, respond};
pub use replace::replace;
pub use upload::upload;
