//! File round-trip: validate and store uploads, read content back for download.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{FileRecord, NewFile, UploadRequest},
    storage::FileStore,
    utils::{calculate_sha256, decode_base64, non_empty},
};

/// Bytes and headers material for a download response.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub content: Bytes,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    non_empty(value).ok_or_else(|| AppError::validation(field, format!("{} is required", field)))
}

/// Validate an upload, hash its content and insert exactly one row.
pub async fn upload<S>(store: &S, request: UploadRequest) -> Result<FileRecord, AppError>
where
    S: FileStore + ?Sized,
{
    let file_name = required(request.file_name, "fileName")?;
    let mime_type = required(request.mime_type, "mimeType")?;
    let content_base64 = required(request.content_base64, "contentBase64")?;

    let content = decode_base64(&content_base64).map_err(|e| {
        warn!("Rejected upload of {}: {}", file_name, e);
        AppError::validation("contentBase64", "contentBase64 is not valid base64")
    })?;

    if content.is_empty() {
        return Err(AppError::validation("contentBase64", "File content is empty"));
    }

    let file = NewFile {
        id: Uuid::new_v4(),
        file_name,
        mime_type,
        file_size: content.len() as i64,
        checksum: calculate_sha256(&content),
        content: Bytes::from(content),
        note: non_empty(request.note),
    };

    let record = store.insert_one(file).await?;

    info!("File uploaded: {} ({} bytes)", record.id, record.file_size);
    Ok(record)
}

/// Fetch a row and normalize its stored content into one buffer.
pub async fn download<S>(store: &S, id: Uuid) -> Result<Download, AppError>
where
    S: FileStore + ?Sized,
{
    let file = store
        .select_content_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File not found for ID {}", id)))?;

    let content = file
        .content
        .ok_or_else(|| AppError::NotFound(format!("No content stored for ID {}", id)))?;

    let kind = content.kind();
    let content = content.into_bytes().await?;

    info!("File downloaded: {} ({} bytes, stored as {})", id, content.len(), kind);

    Ok(Download {
        file_name: file.file_name,
        mime_type: file.mime_type,
        content,
    })
}

pub async fn get<S>(store: &S, id: Uuid) -> Result<FileRecord, AppError>
where
    S: FileStore + ?Sized,
{
    store
        .select_one_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File not found for ID {}", id)))
}

pub async fn list<S>(store: &S) -> Result<Vec<FileRecord>, AppError>
where
    S: FileStore + ?Sized,
{
    Ok(store.list_ordered().await?)
}
