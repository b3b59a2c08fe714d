// Submodules for PostgreSQL-backed storage and the in-memory store
mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub use memory::{ContentRepresentation, MemoryFileStore};
pub use postgres::PgFileStore;

use crate::{
    config::Config,
    content::StoredContent,
    database::init_db,
    models::{FileRecord, NewFile},
};

// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What the download path reads back: enough to build the response.
#[derive(Debug)]
pub struct StoredFile {
    pub file_name: String,
    pub mime_type: String,
    /// `None` when the row exists but holds no content.
    pub content: Option<StoredContent>,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Insert one row and return its metadata, audit fields included.
    async fn insert_one(&self, file: NewFile) -> Result<FileRecord, StorageError>;

    /// Metadata for a single row.
    async fn select_one_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, StorageError>;

    /// Name, type and content for a single row, content in whatever shape the driver produces.
    async fn select_content_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, StorageError>;

    /// All rows, newest first, without content.
    async fn list_ordered(&self) -> Result<Vec<FileRecord>, StorageError>;
}

// Enum to represent store backends
#[derive(Clone)]
pub enum FileStoreBackend {
    Postgres(PgFileStore),
    Memory(MemoryFileStore),
}

// Delegates calls to the chosen backend
#[async_trait]
impl FileStore for FileStoreBackend {
    async fn insert_one(&self, file: NewFile) -> Result<FileRecord, StorageError> {
        match self {
            FileStoreBackend::Postgres(s) => s.insert_one(file).await,
            FileStoreBackend::Memory(s) => s.insert_one(file).await,
        }
    }

    async fn select_one_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, StorageError> {
        match self {
            FileStoreBackend::Postgres(s) => s.select_one_by_id(id).await,
            FileStoreBackend::Memory(s) => s.select_one_by_id(id).await,
        }
    }

    async fn select_content_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, StorageError> {
        match self {
            FileStoreBackend::Postgres(s) => s.select_content_by_id(id).await,
            FileStoreBackend::Memory(s) => s.select_content_by_id(id).await,
        }
    }

    async fn list_ordered(&self) -> Result<Vec<FileRecord>, StorageError> {
        match self {
            FileStoreBackend::Postgres(s) => s.list_ordered().await,
            FileStoreBackend::Memory(s) => s.list_ordered().await,
        }
    }
}

// Initialize the store backend based on config
pub async fn init_store(config: &Config) -> anyhow::Result<FileStoreBackend> {
    match &config.database_url {
        Some(url) if !config.use_memory_store => {
            info!("Initializing PostgreSQL store");
            let pool = init_db(url, config.max_connections).await?;
            Ok(FileStoreBackend::Postgres(PgFileStore::new(pool, &config.audit_user)))
        }
        _ => {
            info!("Initializing in-memory store");
            Ok(FileStoreBackend::Memory(MemoryFileStore::new(&config.audit_user)))
        }
    }
}
