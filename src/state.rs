use crate::storage::{FileStoreBackend, MemoryFileStore};

/// Central application state shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store holding file rows (PostgreSQL or in-memory).
    pub store: FileStoreBackend,
}

impl AppState {
    pub fn new(store: FileStoreBackend) -> Self {
        Self { store }
    }

    pub fn in_memory(store: MemoryFileStore) -> Self {
        Self::new(FileStoreBackend::Memory(store))
    }
}
