//! Shared fixtures for handler tests.

use crate::{
    db,
    models::object::ObjectInfo,
    routes::routes::routes,
    services::{
        file_service::{FileService, FileSettings},
        user_service::SqliteUserRepository,
    },
    state::AppState,
    store::{MemoryObjectStore, ObjectStore, ObjectStream, StoreError, StoreResult},
};
use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::{sync::Arc, time::Duration};

pub const TEST_ENDPOINT: &str = "http://minio.test:9000";
pub const TEST_BUCKET: &str = "files";
const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Memory-backed store that can be told to fail specific calls with a
/// backend fault, as a flaky network or bad credentials would.
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: MemoryObjectStore,
    pub fail_stat: bool,
    pub fail_get: bool,
    pub fail_delete: bool,
}

impl FaultyStore {
    pub fn new(inner: MemoryObjectStore) -> Self {
        Self {
            inner,
            fail_stat: false,
            fail_get: false,
            fail_delete: false,
        }
    }

    fn fault(call: &str) -> StoreError {
        StoreError::Backend(format!("{} timed out", call))
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        self.inner.put_object(bucket, key, body, content_type).await
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        if self.fail_stat {
            return Err(Self::fault("stat"));
        }
        self.inner.stat_object(bucket, key).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStream> {
        if self.fail_get {
            return Err(Self::fault("get"));
        }
        self.inner.get_object(bucket, key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if self.fail_delete {
            return Err(Self::fault("delete"));
        }
        self.inner.delete_object(bucket, key).await
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StoreResult<String> {
        self.inner.presign_get(bucket, key, expires_in).await
    }

    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool> {
        self.inner.bucket_exists(bucket).await
    }
}

pub fn test_file_service(store: Arc<dyn ObjectStore>) -> FileService {
    FileService::new(
        store,
        FileSettings {
            bucket: TEST_BUCKET.into(),
            endpoint: TEST_ENDPOINT.into(),
            url_expiry_hours: 1,
        },
    )
}

/// State over `store` and an in-memory SQLite pool.
pub async fn test_state_with_store(store: Arc<dyn ObjectStore>) -> AppState {
    let pool = Arc::new(db::memory_pool().await.unwrap());
    AppState {
        db: pool.clone(),
        files: test_file_service(store),
        users: Arc::new(SqliteUserRepository::new(pool)),
    }
}

/// State backed by an in-memory object store and an in-memory SQLite pool.
pub async fn test_state() -> (AppState, MemoryObjectStore) {
    let store = MemoryObjectStore::new(TEST_ENDPOINT);
    let state = test_state_with_store(Arc::new(store.clone())).await;
    (state, store)
}

pub async fn test_server_with_store(store: Arc<dyn ObjectStore>) -> TestServer {
    let state = test_state_with_store(store).await;
    TestServer::new(routes(TEST_MAX_UPLOAD_BYTES).with_state(state)).unwrap()
}

pub async fn test_server() -> (TestServer, MemoryObjectStore) {
    let store = MemoryObjectStore::new(TEST_ENDPOINT);
    let server = test_server_with_store(Arc::new(store.clone())).await;
    (server, store)
}
