use anyhow::Result;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use config::{AppConfig, StoreBackend};
use services::{file_service::FileService, user_service::SqliteUserRepository};
use state::AppState;
use store::{MemoryObjectStore, ObjectStore, S3ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting file-gateway with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);

    // --- Handle migration mode ---
    if migrate {
        db::run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Object store client ---
    let store: Arc<dyn ObjectStore> = match cfg.store_backend {
        StoreBackend::S3 => Arc::new(S3ObjectStore::connect(&cfg.s3_settings()).await),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory object store; uploads are lost on restart");
            Arc::new(MemoryObjectStore::new(cfg.endpoint.clone()))
        }
    };

    // --- Initialize core services ---
    let state = AppState {
        db: db.clone(),
        files: FileService::new(store, cfg.file_settings()),
        users: Arc::new(SqliteUserRepository::new(db)),
    };

    // --- Build router ---
    let app = routes::routes::routes(cfg.max_upload_bytes).with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
