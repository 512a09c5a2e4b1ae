//! In-process object store.
//!
//! Keeps objects in a map keyed by `(bucket, key)`. Buckets are implicit: any
//! bucket name is accepted. Signed URLs point at the configured endpoint and
//! carry an expiry timestamp plus an MD5 token over the address and expiry,
//! mirroring the shape of a real presigned URL.

use super::{ObjectStore, ObjectStream, StoreError, StoreResult, check_presign_expiry};
use crate::models::object::ObjectInfo;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone)]
pub struct MemoryObjectStore {
    endpoint: String,
    signing_key: String,
    objects: Arc<RwLock<HashMap<(String, String), Bytes>>>,
}

impl MemoryObjectStore {
    /// Create an empty store whose signed URLs are rooted at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            signing_key: uuid::Uuid::new_v4().to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of objects currently held, across all buckets.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    fn sign(&self, bucket: &str, key: &str, expires_at: i64) -> String {
        let digest = md5::compute(format!(
            "{}\n{}/{}\n{}",
            self.signing_key, bucket, key, expires_at
        ));
        general_purpose::URL_SAFE_NO_PAD.encode(digest.0)
    }

    fn not_found(bucket: &str, key: &str) -> StoreError {
        StoreError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        debug!(
            "memory store: put {}/{} ({} bytes, {})",
            bucket,
            key,
            body.len(),
            content_type
        );
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        let objects = self.objects.read().await;
        let stored = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| Self::not_found(bucket, key))?;
        Ok(ObjectInfo {
            size_bytes: stored.len() as i64,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStream> {
        let content = self
            .objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(bucket, key))?;
        Ok(Box::pin(futures::stream::once(async move { Ok(content) })))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        // S3 deletes are idempotent; a missing key is not an error.
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StoreResult<String> {
        check_presign_expiry(expires_in)?;
        let expires_at = Utc::now().timestamp() + expires_in.as_secs() as i64;
        let signature = self.sign(bucket, key, expires_at);
        Ok(format!(
            "{}/{}/{}?X-Expires={}&X-Signature={}",
            self.endpoint, bucket, key, expires_at, signature
        ))
    }

    async fn bucket_exists(&self, _bucket: &str) -> StoreResult<bool> {
        Ok(true)
    }
}
