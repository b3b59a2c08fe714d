//! Representations a store may hand back for a file's content column, and
//! their normalization into one contiguous buffer.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream::BoxStream};

use crate::error::AppError;

/// Content as returned by a storage driver.
pub enum StoredContent {
    /// Contiguous byte buffer.
    Buffer(Bytes),
    /// Byte stream that must be drained.
    Stream(BoxStream<'static, std::io::Result<Bytes>>),
    /// Wrapper object exposing the raw bytes under its `data` field.
    Wrapped { data: Bytes },
    /// Hex text, optionally carrying PostgreSQL's `\x` prefix.
    Hex(String),
    /// Anything else; the string names the representation.
    Unrecognized(String),
}

impl StoredContent {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredContent::Buffer(_) => "buffer",
            StoredContent::Stream(_) => "stream",
            StoredContent::Wrapped { .. } => "wrapped",
            StoredContent::Hex(_) => "hex",
            StoredContent::Unrecognized(_) => "unrecognized",
        }
    }

    /// Collapses any supported representation into a single buffer.
    ///
    /// `Unrecognized` content and malformed hex fail with
    /// [`AppError::UnsupportedContentShape`]; nothing is guessed.
    pub async fn into_bytes(self) -> Result<Bytes, AppError> {
        match self {
            StoredContent::Buffer(bytes) => Ok(bytes),
            StoredContent::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| {
                        AppError::InternalServerError(format!("Failed to read content stream: {}", e))
                    })?;
                    buffer.extend_from_slice(&chunk);
                }
                Ok(buffer.freeze())
            }
            StoredContent::Wrapped { data } => Ok(data),
            StoredContent::Hex(text) => {
                let digits = text.strip_prefix("\\x").unwrap_or(&text);
                hex::decode(digits).map(Bytes::from).map_err(|e| {
                    AppError::UnsupportedContentShape(format!("hex string could not be decoded: {}", e))
                })
            }
            StoredContent::Unrecognized(repr) => Err(AppError::UnsupportedContentShape(repr)),
        }
    }
}

impl fmt::Debug for StoredContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredContent::Buffer(b) => f.debug_tuple("Buffer").field(&b.len()).finish(),
            StoredContent::Stream(_) => f.write_str("Stream(..)"),
            StoredContent::Wrapped { data } => {
                f.debug_struct("Wrapped").field("data", &data.len()).finish()
            }
            StoredContent::Hex(s) => f.debug_tuple("Hex").field(&s.len()).finish(),
            StoredContent::Unrecognized(r) => f.debug_tuple("Unrecognized").field(r).finish(),
        }
    }
}
