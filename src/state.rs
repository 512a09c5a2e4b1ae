//! Shared application state handed to every handler.

use crate::services::{file_service::FileService, user_service::UserRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Pool backing the user repository; also checked by `/readyz`.
    pub db: Arc<SqlitePool>,
    pub files: FileService,
    pub users: Arc<dyn UserRepository>,
}
