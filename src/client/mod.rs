//! Client side of the file round-trip: HTTP transport plus the view controller
//! that drives list, upload and download interactions.

mod controller;
mod save;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{FileRecord, UploadRequest};

pub use controller::{Notifier, UploadStatus, ViewController};
pub use save::{DirectorySaveTarget, SaveTarget};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file selected")]
    NoFileSelected,

    #[error("File ID not found: {0}")]
    UnknownFile(Uuid),
}

/// Operations the view needs from the file service.
#[async_trait]
pub trait FileApi: Send + Sync {
    async fn list_files(&self) -> Result<Vec<FileRecord>, ClientError>;

    async fn upload(&self, request: &UploadRequest) -> Result<FileRecord, ClientError>;

    async fn download(&self, id: Uuid) -> Result<Bytes, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`FileApi`] over HTTP.
#[derive(Clone)]
pub struct HttpFileApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFileApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success status into [`ClientError::Status`], keeping the server's message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FileApi for HttpFileApi {
    async fn list_files(&self) -> Result<Vec<FileRecord>, ClientError> {
        let response = self.client.get(self.url("/files")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn upload(&self, request: &UploadRequest) -> Result<FileRecord, ClientError> {
        let response = self
            .client
            .post(self.url("/upload"))
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn download(&self, id: Uuid) -> Result<Bytes, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/files/{}/download", id)))
            .send()
            .await?;
        Ok(Self::check(response).await?.bytes().await?)
    }
}
