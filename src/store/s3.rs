//! S3-compatible object store client built on `aws-sdk-s3`.
//!
//! Uses path-style addressing (`endpoint/bucket/key`) so it works against
//! MinIO and other self-hosted services as well as AWS.

use super::{ObjectStore, ObjectStream, StoreError, StoreResult, check_presign_expiry};
use crate::models::object::ObjectInfo;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{Builder, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use bytes::Bytes;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Connection settings for an S3-compatible endpoint.
#[derive(Clone, Debug)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `settings`.
    ///
    /// Static credentials are used when both keys are set; otherwise the SDK's
    /// default provider chain (env, profile, instance metadata) applies.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(settings.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&settings.access_key, &settings.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "file-gateway",
            ));
        }

        let shared = loader.load().await;
        let config = Builder::from(&shared)
            .endpoint_url(settings.endpoint.clone())
            .force_path_style(true)
            .build();

        Self::new(Client::from_conf(config))
    }
}

fn backend_error<E: std::error::Error>(err: E) -> StoreError {
    StoreError::Backend(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        let size = body.len() as i64;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(backend_error)?;
        debug!("stored {}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                    StoreError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    backend_error(err)
                }
            })?;

        Ok(ObjectInfo {
            size_bytes: output.content_length().unwrap_or(0),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStream> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    StoreError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    backend_error(err)
                }
            })?;

        let reader = output.body.into_async_read();
        Ok(Box::pin(ReaderStream::new(reader)))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        debug!("deleted {}/{}", bucket, key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StoreResult<String> {
        // The SDK only enforces the upper bound; a zero expiry would sign an
        // already-expired URL.
        check_presign_expiry(expires_in)?;
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StoreError::Signing(err.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| StoreError::Signing(DisplayErrorContext(err).to_string()))?;
        Ok(request.uri().to_string())
    }

    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(backend_error(err)),
        }
    }
}
