use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::{ClientError, FileApi, SaveTarget};
use crate::{
    models::{FileRecord, UploadRequest},
    utils::encode_base64,
};

/// Used when the file's extension does not map to a known type.
pub const DEFAULT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// User-visible notifications.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

/// State and event handling for the file list view.
pub struct ViewController<A, N, S> {
    api: A,
    notifier: N,
    save_target: S,
    files: Vec<FileRecord>,
    selected: Option<PathBuf>,
    note: String,
    upload_enabled: bool,
    status: UploadStatus,
}

impl<A, N, S> ViewController<A, N, S>
where
    A: FileApi,
    N: Notifier,
    S: SaveTarget,
{
    pub fn new(api: A, notifier: N, save_target: S) -> Self {
        Self {
            api,
            notifier,
            save_target,
            files: Vec::new(),
            selected: None,
            note: String::new(),
            upload_enabled: false,
            status: UploadStatus::Idle,
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload_enabled
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Replace the local list with the server's. The old list survives a failure.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.api.list_files().await {
            Ok(files) => {
                self.files = files;
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&format!("Failed to load files: {}", e));
                Err(e)
            }
        }
    }

    pub fn select_file(&mut self, path: Option<PathBuf>) {
        self.selected = path;
        self.upload_enabled = self.selected.is_some();
    }

    /// Read, encode and send the selected file.
    ///
    /// Inputs are cleared only after the server confirms the upload; on any
    /// failure they stay populated so the user can retry.
    pub async fn upload(&mut self) -> Result<FileRecord, ClientError> {
        let Some(path) = self.selected.clone() else {
            self.notifier.warning("Please select a file first.");
            return Err(ClientError::NoFileSelected);
        };

        self.upload_enabled = false;
        self.status = UploadStatus::Uploading;

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) => {
                self.notifier.error("Failed to read file.");
                self.status = UploadStatus::Idle;
                self.upload_enabled = self.selected.is_some();
                return Err(e.into());
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let request = UploadRequest {
            file_name: Some(file_name),
            mime_type: Some(
                mime_guess::from_path(&path)
                    .first_raw()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string(),
            ),
            content_base64: Some(encode_base64(&content)),
            note: Some(self.note.clone()).filter(|note| !note.is_empty()),
        };

        let result = self.api.upload(&request).await;

        match &result {
            Ok(record) => {
                self.notifier.info(&format!("File \"{}\" uploaded successfully!", record.file_name));
                self.status = UploadStatus::Succeeded;
                self.selected = None;
                self.note.clear();
                if let Err(e) = self.load().await {
                    debug!("List refresh after upload failed: {}", e);
                }
            }
            Err(e) => {
                self.notifier.error(&format!("Upload failed: {}", e));
                self.status = UploadStatus::Failed;
            }
        }

        self.upload_enabled = self.selected.is_some();
        result
    }

    /// Fetch a listed file's bytes and save them under its original name.
    pub async fn download(&mut self, id: Uuid) -> Result<PathBuf, ClientError> {
        let Some(file_name) = self
            .files
            .iter()
            .find(|file| file.id == id)
            .map(|file| file.file_name.clone())
        else {
            self.notifier.error("File ID not found.");
            return Err(ClientError::UnknownFile(id));
        };

        self.notifier.info(&format!("Downloading {}...", file_name));

        let result = match self.api.download(id).await {
            Ok(content) => self
                .save_target
                .save(&file_name, content)
                .await
                .map_err(ClientError::from),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.notifier.info("Download complete!"),
            Err(e) => self.notifier.error(&format!("Download failed: {}", e)),
        }

        result
    }
}
