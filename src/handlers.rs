use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::Response,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::AppError,
    files::{self, Download},
    models::{FileRecord, UploadRequest},
    state::AppState,
    utils::attachment_disposition,
};

const OCTET_STREAM: &str = "application/octet-stream";

/// Upload a base64-encoded file sent as JSON.
pub async fn upload_file(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileRecord>), AppError> {
    let Json(request) = payload.map_err(|e| {
        error!("Error parsing upload body: {}", e);
        AppError::BadRequest(format!("Invalid upload body: {}", e.body_text()))
    })?;

    let record = files::upload(&state.store, request).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Download a file by its unique ID.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let download = files::download(&state.store, id).await?;
    attachment_response(download)
}

/// Get metadata for a single file by its ID.
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileRecord>, AppError> {
    Ok(Json(files::get(&state.store, id).await?))
}

/// List uploaded files, newest first.
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    Ok(Json(files::list(&state.store).await?))
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Build the binary response that makes the browser save the file.
fn attachment_response(download: Download) -> Result<Response, AppError> {
    let mime_type = if download.mime_type.is_empty() {
        OCTET_STREAM
    } else {
        download.mime_type.as_str()
    };

    let content_type = header::HeaderValue::from_str(mime_type)
        .unwrap_or_else(|_| header::HeaderValue::from_static(OCTET_STREAM));

    // Preserve the original filename; fall back to a bare attachment if it is not a valid header
    let disposition = header::HeaderValue::from_str(&attachment_disposition(&download.file_name))
        .unwrap_or_else(|_| header::HeaderValue::from_static("attachment"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, download.content.len())
        .body(Body::from(download.content))
        .map_err(|e| AppError::InternalServerError(format!("Failed to build response: {}", e)))
}
