//! FileService: the façade between the HTTP handlers and the object store.
//!
//! Owns three policies and nothing else:
//! - object naming: a fresh UUID plus the uploaded file's extension,
//! - URL fallback: `url` degrades to an unsigned `endpoint/bucket/name` URL
//!   when signing fails,
//! - error translation into [`FileError`].
//!
//! Every store failure is surfaced once; there is no retry.

use crate::{
    models::object::NewObject,
    store::{ObjectStore, ObjectStream, StoreError},
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const SECONDS_PER_HOUR: u64 = 60 * 60;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("object `{0}` does not exist")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type FileResult<T> = Result<T, FileError>;

/// Where objects live and how long default URLs stay valid.
#[derive(Clone, Debug)]
pub struct FileSettings {
    pub bucket: String,
    /// Public endpoint of the object store, used for unsigned fallback URLs.
    pub endpoint: String,
    pub url_expiry_hours: u32,
}

#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn ObjectStore>,
    settings: FileSettings,
}

impl FileService {
    pub fn new(store: Arc<dyn ObjectStore>, settings: FileSettings) -> Self {
        Self { store, settings }
    }

    pub fn bucket(&self) -> &str {
        &self.settings.bucket
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Write a new object and return its generated name.
    ///
    /// Empty uploads are rejected before the store is contacted.
    pub async fn upload(&self, object: NewObject) -> FileResult<String> {
        if object.is_empty() {
            return Err(FileError::InvalidInput("file must not be empty".into()));
        }

        let object_name = generate_object_name(object.original_name.as_deref());
        let content_type = object
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        debug!(
            "uploading {} ({} bytes, {})",
            object_name,
            object.size(),
            content_type
        );
        self.store
            .put_object(&self.settings.bucket, &object_name, object.content, content_type)
            .await?;

        Ok(object_name)
    }

    /// Whether the object exists. Any store fault counts as "no".
    pub async fn exists(&self, object_name: &str) -> bool {
        match self.store.stat_object(&self.settings.bucket, object_name).await {
            Ok(info) => {
                debug!("stat {}: {} bytes", object_name, info.size_bytes);
                true
            }
            Err(err) => {
                debug!("stat {} failed, treating as absent: {}", object_name, err);
                false
            }
        }
    }

    /// Signed URL with the default expiry, or the direct URL if signing fails.
    pub async fn url(&self, object_name: &str) -> String {
        match self
            .presigned_url(object_name, self.settings.url_expiry_hours)
            .await
        {
            Ok(url) => url,
            Err(err) => {
                warn!(
                    "signing url for {} failed, falling back to direct url: {}",
                    object_name, err
                );
                self.direct_url(object_name)
            }
        }
    }

    /// Signed GET URL valid for exactly `expiry_hours`.
    pub async fn presigned_url(&self, object_name: &str, expiry_hours: u32) -> FileResult<String> {
        let expires_in = Duration::from_secs(u64::from(expiry_hours) * SECONDS_PER_HOUR);
        let url = self
            .store
            .presign_get(&self.settings.bucket, object_name, expires_in)
            .await?;
        Ok(url)
    }

    pub async fn delete(&self, object_name: &str) -> FileResult<()> {
        self.store
            .delete_object(&self.settings.bucket, object_name)
            .await?;
        debug!("deleted {}", object_name);
        Ok(())
    }

    /// Open a stream over the object's content. The caller owns the stream.
    pub async fn stream(&self, object_name: &str) -> FileResult<ObjectStream> {
        Ok(self
            .store
            .get_object(&self.settings.bucket, object_name)
            .await?)
    }

    fn direct_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.bucket,
            object_name
        )
    }
}

/// Extension of `original_name`, dot included: `"a.tar.gz"` -> `".gz"`.
fn extension_of(original_name: Option<&str>) -> &str {
    original_name
        .and_then(|name| name.rfind('.').map(|idx| &name[idx..]))
        .unwrap_or("")
}

fn generate_object_name(original_name: Option<&str>) -> String {
    format!("{}{}", Uuid::new_v4(), extension_of(original_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::object::ObjectInfo,
        store::{MemoryObjectStore, StoreResult},
        test_support::FaultyStore,
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::TryStreamExt;

    const ENDPOINT: &str = "http://minio.local:9000";

    fn settings() -> FileSettings {
        FileSettings {
            bucket: "files".into(),
            endpoint: ENDPOINT.into(),
            url_expiry_hours: 1,
        }
    }

    fn upload_of(content: &'static [u8], name: &str) -> NewObject {
        NewObject {
            content: Bytes::from_static(content),
            content_type: Some("text/plain".into()),
            original_name: Some(name.into()),
        }
    }

    /// Delegates to a memory store but can never sign.
    struct UnsignableStore(MemoryObjectStore);

    #[async_trait]
    impl ObjectStore for UnsignableStore {
        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> StoreResult<()> {
            self.0.put_object(bucket, key, body, content_type).await
        }

        async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
            self.0.stat_object(bucket, key).await
        }

        async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStream> {
            self.0.get_object(bucket, key).await
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
            self.0.delete_object(bucket, key).await
        }

        async fn presign_get(
            &self,
            _bucket: &str,
            _key: &str,
            _expires_in: Duration,
        ) -> StoreResult<String> {
            Err(StoreError::Signing("credentials unavailable".into()))
        }

        async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool> {
            self.0.bucket_exists(bucket).await
        }
    }

    #[test]
    fn test_extension_takes_last_dot() {
        assert_eq!(extension_of(Some("report.v2.csv")), ".csv");
        assert_eq!(extension_of(Some("README")), "");
        assert_eq!(extension_of(Some("archive.")), ".");
        assert_eq!(extension_of(None), "");
    }

    #[tokio::test]
    async fn test_empty_upload_never_reaches_store() {
        let store = MemoryObjectStore::new(ENDPOINT);
        let service = FileService::new(Arc::new(store.clone()), settings());

        let result = service.upload(upload_of(b"", "a.txt")).await;

        assert!(matches!(result, Err(FileError::InvalidInput(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_upload_names_keep_only_the_extension() {
        let service = FileService::new(Arc::new(MemoryObjectStore::new(ENDPOINT)), settings());

        let csv = service
            .upload(upload_of(b"a,b\n1,2\n", "report.v2.csv"))
            .await
            .unwrap();
        assert!(csv.ends_with(".csv"));
        assert!(!csv.contains("report"));
        assert!(Uuid::parse_str(csv.trim_end_matches(".csv")).is_ok());

        let readme = service.upload(upload_of(b"# hi", "README")).await.unwrap();
        assert!(!readme.contains('.'));
        assert!(Uuid::parse_str(&readme).is_ok());
    }

    #[tokio::test]
    async fn test_uploaded_object_exists_and_streams_back() {
        let service = FileService::new(Arc::new(MemoryObjectStore::new(ENDPOINT)), settings());

        let name = service.upload(upload_of(b"0123456789", "a.txt")).await.unwrap();
        assert!(service.exists(&name).await);

        let chunks: Vec<Bytes> = service
            .stream(&name)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"0123456789");
    }

    #[tokio::test]
    async fn test_delete_then_exists_is_false() {
        let service = FileService::new(Arc::new(MemoryObjectStore::new(ENDPOINT)), settings());

        let name = service.upload(upload_of(b"bye", "a.txt")).await.unwrap();
        service.delete(&name).await.unwrap();

        assert!(!service.exists(&name).await);
        assert!(service.stream(&name).await.is_err());
    }

    #[tokio::test]
    async fn test_url_is_signed_when_signing_works() {
        let service = FileService::new(Arc::new(MemoryObjectStore::new(ENDPOINT)), settings());

        let url = service.url("x.txt").await;

        assert!(url.starts_with("http://minio.local:9000/files/x.txt?"));
        assert!(url.contains("X-Signature="));
    }

    #[tokio::test]
    async fn test_url_falls_back_when_signing_fails() {
        let store = UnsignableStore(MemoryObjectStore::new(ENDPOINT));
        let mut settings = settings();
        settings.endpoint = format!("{}/", ENDPOINT);
        let service = FileService::new(Arc::new(store), settings);

        let url = service.url("x.txt").await;

        assert_eq!(url, "http://minio.local:9000/files/x.txt");
    }

    #[tokio::test]
    async fn test_presigned_url_propagates_signing_failure() {
        let store = UnsignableStore(MemoryObjectStore::new(ENDPOINT));
        let service = FileService::new(Arc::new(store), settings());

        let result = service.presigned_url("x.txt", 2).await;

        assert!(matches!(
            result,
            Err(FileError::Store(StoreError::Signing(_)))
        ));
    }

    #[tokio::test]
    async fn test_presigned_url_honours_requested_expiry() {
        let service = FileService::new(Arc::new(MemoryObjectStore::new(ENDPOINT)), settings());

        let before = chrono::Utc::now().timestamp();
        let url = service.presigned_url("x.txt", 3).await.unwrap();

        let expires_at: i64 = url
            .split("X-Expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        let delta = expires_at - before;
        assert!((3 * 3600..=3 * 3600 + 5).contains(&delta));
    }

    #[tokio::test]
    async fn test_exists_is_false_on_store_fault() {
        let inner = MemoryObjectStore::new(ENDPOINT);
        let mut store = FaultyStore::new(inner.clone());
        store.fail_stat = true;
        let service = FileService::new(Arc::new(store), settings());
        inner
            .put_object("files", "a.txt", Bytes::from_static(b"abc"), "text/plain")
            .await
            .unwrap();

        assert!(!service.exists("a.txt").await);
    }
}
