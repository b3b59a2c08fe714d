use axum::{Router, routing::{get, post}};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{download_file, get_file, health_check, list_files, upload_file},
    state::AppState,
};

pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
        .route("/files/{id}", get(get_file))
        .route("/files/{id}/download", get(download_file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
