use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, stream};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FileStore, StorageError, StoredFile};
use crate::{
    content::StoredContent,
    models::{FileRecord, NewFile},
};

/// Shape in which the in-memory store hands content back on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentRepresentation {
    #[default]
    Buffer,
    Stream { chunk_size: usize },
    Wrapped,
    Hex,
    Unrecognized,
    /// Row is returned with no content at all.
    Missing,
}

struct MemoryRow {
    record: FileRecord,
    content: Bytes,
}

// In-process store, used for local runs and tests
#[derive(Clone)]
pub struct MemoryFileStore {
    rows: Arc<RwLock<Vec<MemoryRow>>>,
    audit_user: String,
    representation: ContentRepresentation,
}

impl MemoryFileStore {
    pub fn new(audit_user: &str) -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            audit_user: audit_user.to_string(),
            representation: ContentRepresentation::default(),
        }
    }

    pub fn with_representation(mut self, representation: ContentRepresentation) -> Self {
        self.representation = representation;
        self
    }

    fn represent(&self, content: &Bytes) -> Option<StoredContent> {
        let content = content.clone();
        let stored = match self.representation {
            ContentRepresentation::Buffer => StoredContent::Buffer(content),
            ContentRepresentation::Stream { chunk_size } => {
                let size = chunk_size.max(1);
                let chunks: Vec<std::io::Result<Bytes>> = (0..content.len())
                    .step_by(size)
                    .map(|start| Ok(content.slice(start..(start + size).min(content.len()))))
                    .collect();
                StoredContent::Stream(stream::iter(chunks).boxed())
            }
            ContentRepresentation::Wrapped => StoredContent::Wrapped { data: content },
            ContentRepresentation::Hex => StoredContent::Hex(hex::encode(&content)),
            ContentRepresentation::Unrecognized => StoredContent::Unrecognized("INT4".to_string()),
            ContentRepresentation::Missing => return None,
        };
        Some(stored)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn insert_one(&self, file: NewFile) -> Result<FileRecord, StorageError> {
        let now = Utc::now();
        let record = FileRecord {
            id: file.id,
            file_name: file.file_name,
            mime_type: file.mime_type,
            file_size: file.file_size,
            checksum: file.checksum,
            note: file.note,
            created_at: now,
            created_by: Some(self.audit_user.clone()),
            modified_at: now,
            modified_by: Some(self.audit_user.clone()),
        };

        self.rows.write().await.push(MemoryRow {
            record: record.clone(),
            content: file.content,
        });

        Ok(record)
    }

    async fn select_one_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.record.id == id).map(|row| row.record.clone()))
    }

    async fn select_content_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.record.id == id).map(|row| StoredFile {
            file_name: row.record.file_name.clone(),
            mime_type: row.record.mime_type.clone(),
            content: self.represent(&row.content),
        }))
    }

    async fn list_ordered(&self) -> Result<Vec<FileRecord>, StorageError> {
        let rows = self.rows.read().await;
        // Reverse insertion order first so equal timestamps still come out newest first.
        let mut records: Vec<FileRecord> = rows.iter().rev().map(|row| row.record.clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_file(name: &str, content: &'static [u8]) -> NewFile {
        NewFile {
            id: Uuid::new_v4(),
            file_name: name.to_string(),
            mime_type: "text/plain".to_string(),
            file_size: content.len() as i64,
            content: Bytes::from_static(content),
            checksum: crate::utils::calculate_sha256(content),
            note: None,
        }
    }

    #[tokio::test]
    async fn insert_stamps_audit_fields() {
        let store = MemoryFileStore::new("alice");
        let record = store.insert_one(new_file("a.txt", b"abc")).await.unwrap();

        assert_eq!(record.created_by.as_deref(), Some("alice"));
        assert_eq!(record.modified_by.as_deref(), Some("alice"));
        assert_eq!(record.created_at, record.modified_at);
        assert_eq!(store.select_one_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryFileStore::new("anonymous");
        let first = store.insert_one(new_file("first.txt", b"1")).await.unwrap();
        let second = store.insert_one(new_file("second.txt", b"2")).await.unwrap();
        let third = store.insert_one(new_file("third.txt", b"3")).await.unwrap();

        let ids: Vec<Uuid> = store.list_ordered().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn stream_representation_reassembles() {
        let store = MemoryFileStore::new("anonymous")
            .with_representation(ContentRepresentation::Stream { chunk_size: 2 });
        let record = store.insert_one(new_file("s.txt", b"Hello")).await.unwrap();

        let stored = store.select_content_by_id(record.id).await.unwrap().unwrap();
        let content = stored.content.unwrap();
        assert_eq!(content.kind(), "stream");
        assert_eq!(&content.into_bytes().await.unwrap()[..], b"Hello");
    }

    #[tokio::test]
    async fn missing_representation_has_no_content() {
        let store = MemoryFileStore::new("anonymous").with_representation(ContentRepresentation::Missing);
        let record = store.insert_one(new_file("m.txt", b"x")).await.unwrap();

        let stored = store.select_content_by_id(record.id).await.unwrap().unwrap();
        assert!(stored.content.is_none());
        assert!(store.select_content_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
