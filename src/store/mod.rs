//! Object store client abstraction.
//!
//! The gateway never stores payloads itself: every byte lives in an external
//! object store addressed by `bucket` + `key`. This module defines the narrow
//! surface the file façade needs and the two clients that implement it:
//!
//! - [`S3ObjectStore`] talks to any S3-compatible service (AWS, MinIO, ...).
//! - [`MemoryObjectStore`] keeps objects in process, for tests and local runs.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::{io, pin::Pin, time::Duration};
use thiserror::Error;

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use crate::models::object::ObjectInfo;

/// Longest validity a signed URL may carry (S3 caps presigning at 7 days).
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Readable byte stream over an object's content.
///
/// Dropping the stream releases the underlying connection or buffer.
pub type ObjectStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("failed to sign url: {0}")]
    Signing(String),
    #[error("object store request failed: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the gateway performs against an object store.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `bucket/key`, replacing nothing (keys are fresh).
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()>;

    /// Fetch object metadata without its content.
    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo>;

    /// Open a stream over the object's content.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStream>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    /// Produce a time-limited GET URL for the object.
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration)
    -> StoreResult<String>;

    /// Check that the bucket is reachable with the configured credentials.
    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool>;
}

/// Validate a presign duration against the store-wide limits.
pub(crate) fn check_presign_expiry(expires_in: Duration) -> StoreResult<()> {
    if expires_in.is_zero() {
        return Err(StoreError::Signing("expiry must be positive".into()));
    }
    if expires_in > MAX_PRESIGN_EXPIRY {
        return Err(StoreError::Signing(format!(
            "expiry of {}s exceeds the maximum of {}s",
            expires_in.as_secs(),
            MAX_PRESIGN_EXPIRY.as_secs()
        )));
    }
    Ok(())
}
