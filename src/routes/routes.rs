//! Defines routes for the file and user resources.
//!
//! ## Structure
//! - **File endpoints** (object store façade)
//!   - `POST   /file/upload`       : multipart upload, field `file`
//!   - `GET    /file/presigned-url`: `?objectName=&expiry=` (hours, default 1)
//!   - `GET    /file/download`     : `?objectName=`, streamed attachment
//!   - `DELETE /file/delete`       : `?objectName=`
//!   - `GET    /file/exists`       : `?objectName=`
//!   - `GET    /file/url`          : `?objectName=`
//!
//! - **User endpoints** (read-only)
//!   - `GET    /user/list`
//!   - `GET    /user/byId/{id}`

use crate::{
    handlers::{
        file_handlers::{
            delete_file, download_file, file_exists, file_url, presigned_url, upload_file,
        },
        health_handlers::{healthz, readyz},
        user_handlers::{list_users, user_by_id},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Build and return the router for all gateway routes.
///
/// Uploads are capped at `max_upload_bytes`; larger bodies are rejected with
/// 413 before reaching the handler.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // File routes
        .route(
            "/file/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/file/presigned-url", get(presigned_url))
        .route("/file/download", get(download_file))
        .route("/file/delete", delete(delete_file))
        .route("/file/exists", get(file_exists))
        .route("/file/url", get(file_url))
        // User routes
        .route("/user/list", get(list_users))
        .route("/user/byId/{id}", get(user_by_id))
}
