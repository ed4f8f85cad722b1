use std::sync::{Arc, OnceLock};

use common::storage::ChunkStore;

use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: StoreSlot,
}

/// Process-wide chunk store handle, filled once the database is ready.
///
/// Until then every store-backed request fails with `503`.
#[derive(Clone, Default)]
pub struct StoreSlot(Arc<OnceLock<Arc<dyn ChunkStore>>>);

impl StoreSlot {
    /// An empty slot, to be filled by [`set`](Self::set).
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that is ready from the start.
    pub fn ready(store: Arc<dyn ChunkStore>) -> Self {
        let slot = Self::new();
        slot.set(store);
        slot
    }

    /// Install the store. Returns `false` if one was already installed.
    pub fn set(&self, store: Arc<dyn ChunkStore>) -> bool {
        self.0.set(store).is_ok()
    }

    pub fn get(&self) -> Result<Arc<dyn ChunkStore>, AppError> {
        self.0.get().cloned().ok_or(AppError::StorageUnavailable)
    }
}
