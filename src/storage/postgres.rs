use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use sqlx::{Column, PgPool, Row, TypeInfo, ValueRef, postgres::PgRow};
use uuid::Uuid;

use super::{FileStore, StorageError, StoredFile};
use crate::{
    content::StoredContent,
    models::{FileRecord, NewFile},
};

// PostgreSQL store, content kept in the `files.content` column
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
    audit_user: String,
}

/// `{ "data": [..] }` as written by drivers that serialize buffers to JSON.
#[derive(Deserialize)]
struct BufferWrapper {
    data: Vec<u8>,
}

impl PgFileStore {
    pub fn new(pool: PgPool, audit_user: &str) -> Self {
        Self {
            pool,
            audit_user: audit_user.to_string(),
        }
    }
}

/// How a `content` column of a given PostgreSQL type has to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentColumn {
    Bytes,
    Text,
    Json,
    Other(String),
}

impl ContentColumn {
    fn from_type_name(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "BYTEA" => ContentColumn::Bytes,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => ContentColumn::Text,
            "JSON" | "JSONB" => ContentColumn::Json,
            other => ContentColumn::Other(other.to_string()),
        }
    }
}

/// A JSON content value is only usable when it carries a `data` byte array.
fn wrapped_from_json(value: serde_json::Value, type_name: &str) -> StoredContent {
    match serde_json::from_value::<BufferWrapper>(value) {
        Ok(wrapper) => StoredContent::Wrapped { data: Bytes::from(wrapper.data) },
        Err(_) => StoredContent::Unrecognized(format!("{} without a data byte array", type_name)),
    }
}

/// Maps the `content` column onto a [`StoredContent`] tag by its declared type.
fn read_content(row: &PgRow) -> Result<Option<StoredContent>, sqlx::Error> {
    if row.try_get_raw("content")?.is_null() {
        return Ok(None);
    }

    let type_name = row.try_column("content")?.type_info().name().to_ascii_uppercase();

    let content = match ContentColumn::from_type_name(&type_name) {
        ContentColumn::Bytes => StoredContent::Buffer(Bytes::from(row.try_get::<Vec<u8>, _>("content")?)),
        ContentColumn::Text => StoredContent::Hex(row.try_get("content")?),
        ContentColumn::Json => wrapped_from_json(row.try_get("content")?, &type_name),
        ContentColumn::Other(name) => StoredContent::Unrecognized(name),
    };

    Ok(Some(content))
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn insert_one(&self, file: NewFile) -> Result<FileRecord, StorageError> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (
                id, file_name, mime_type, file_size, content, checksum, note,
                created_by, modified_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id, file_name, mime_type, file_size, checksum, note,
                created_at, created_by, modified_at, modified_by
            "#,
        )
        .bind(file.id)
        .bind(&file.file_name)
        .bind(&file.mime_type)
        .bind(file.file_size)
        .bind(file.content.as_ref())
        .bind(&file.checksum)
        .bind(&file.note)
        .bind(&self.audit_user)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted file row {}", record.id);
        Ok(record)
    }

    async fn select_one_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, StorageError> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, file_name, mime_type, file_size, checksum, note,
                created_at, created_by, modified_at, modified_by
            FROM files WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn select_content_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, StorageError> {
        let row = sqlx::query("SELECT file_name, mime_type, content FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredFile {
            file_name: row.try_get("file_name")?,
            mime_type: row.try_get("mime_type")?,
            content: read_content(&row)?,
        }))
    }

    async fn list_ordered(&self) -> Result<Vec<FileRecord>, StorageError> {
        let records = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, file_name, mime_type, file_size, checksum, note,
                created_at, created_by, modified_at, modified_by
            FROM files ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
