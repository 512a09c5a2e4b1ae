use crate::services::{file_service::FileError, user_service::RepositoryError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Prefix the message with the failed operation. Only server faults are
    /// prefixed; client errors already read as complete sentences.
    pub fn during(mut self, operation: &str) -> Self {
        if self.status.is_server_error() {
            self.message = format!("{}: {}", operation, self.message);
        }
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed with {}: {}", self.status, self.message);
        }

        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::InvalidInput(msg) => AppError::bad_request(msg),
            FileError::NotFound(_) => AppError::not_found("file does not exist"),
            FileError::Store(inner) => AppError::internal(inner.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_file_errors_map_to_status_codes() {
        let bad = AppError::from(FileError::InvalidInput("file must not be empty".into()));
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let missing = AppError::from(FileError::NotFound("x".into()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let store = AppError::from(FileError::Store(StoreError::Backend("timeout".into())));
        assert_eq!(store.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.message.contains("timeout"));
    }

    #[test]
    fn test_during_prefixes_only_server_errors() {
        let internal = AppError::internal("boom").during("file delete failed");
        assert_eq!(internal.message, "file delete failed: boom");

        let bad = AppError::bad_request("file must not be empty").during("file upload failed");
        assert_eq!(bad.message, "file must not be empty");
    }
}
