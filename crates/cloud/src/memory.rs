//! In-process object store.
//!
//! Permission URLs are fake (`{base_url}/{key}?...`); nothing listens on
//! them. Tests and local tooling "upload" through [`InMemoryObjectStore::complete_upload`]
//! or [`InMemoryObjectStore::insert`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fieldday_core::error::CoreError;
use fieldday_core::storage::{ObjectAttributes, ObjectStore, PresignedUpload};
use tokio::sync::RwLock;

/// Header carrying user metadata, as S3 spells it.
const METADATA_HEADER_PREFIX: &str = "x-amz-meta-";

#[derive(Default)]
pub struct InMemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, ObjectAttributes>>,
    /// Attributes bound into write permissions, awaiting their upload.
    pending: RwLock<HashMap<String, ObjectAttributes>>,
    fail_head: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Store an object directly.
    pub async fn insert(&self, key: &str, attributes: ObjectAttributes) {
        self.objects
            .write()
            .await
            .insert(key.to_string(), attributes);
    }

    /// Simulate the client finishing an upload through a previously issued
    /// write permission. Returns `false` if no permission was issued for `key`.
    pub async fn complete_upload(&self, key: &str, size: i64) -> bool {
        let Some(mut attributes) = self.pending.write().await.remove(key) else {
            return false;
        };
        attributes.size = Some(size);
        self.insert(key, attributes).await;
        true
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Make every subsequent [`ObjectStore::head`] call fail.
    pub fn set_fail_head(&self, fail: bool) {
        self.fail_head.store(fail, Ordering::SeqCst);
    }

    fn url(&self, key: &str, op: &str, ttl: Duration) -> String {
        format!("{}/{key}?op={op}&expires={}", self.base_url, ttl.as_secs())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<PresignedUpload, CoreError> {
        let mut headers = BTreeMap::from([("content-type".to_string(), content_type.to_string())]);
        for (name, value) in metadata {
            headers.insert(format!("{METADATA_HEADER_PREFIX}{name}"), value.clone());
        }

        self.pending.write().await.insert(
            key.to_string(),
            ObjectAttributes {
                content_type: Some(content_type.to_string()),
                size: None,
                metadata: metadata.clone(),
            },
        );

        Ok(PresignedUpload {
            url: self.url(key, "put", ttl),
            method: "PUT",
            headers,
            expires_in_secs: ttl.as_secs(),
        })
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CoreError> {
        Ok(self.url(key, "get", ttl))
    }

    async fn head(&self, key: &str) -> Result<ObjectAttributes, CoreError> {
        if self.fail_head.load(Ordering::SeqCst) {
            return Err(CoreError::Internal(format!("HEAD {key} failed: injected failure")));
        }
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::not_found("StoredObject", key))
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldday_core::error::CoreError;

    #[tokio::test]
    async fn upload_through_permission_keeps_bound_metadata() {
        let store = InMemoryObjectStore::new("http://mock/");
        let metadata = HashMap::from([("eventid".to_string(), "ev-1".to_string())]);
        let upload = store
            .presign_put("2025/originals/m.jpg", "image/jpeg", &metadata, Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(upload.url, "http://mock/2025/originals/m.jpg?op=put&expires=900");
        assert_eq!(upload.headers["x-amz-meta-eventid"], "ev-1");
        assert!(!store.contains("2025/originals/m.jpg").await);

        assert!(store.complete_upload("2025/originals/m.jpg", 1234).await);
        let attrs = store.head("2025/originals/m.jpg").await.unwrap();
        assert_eq!(attrs.size, Some(1234));
        assert_eq!(attrs.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(attrs.metadata, metadata);
    }

    #[tokio::test]
    async fn head_of_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new("http://mock");
        assert!(matches!(
            store.head("nope").await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(!store.complete_upload("nope", 1).await);
    }

    #[tokio::test]
    async fn injected_head_failure() {
        let store = InMemoryObjectStore::new("http://mock");
        store.insert("k", ObjectAttributes::default()).await;
        store.set_fail_head(true);
        assert!(matches!(store.head("k").await, Err(CoreError::Internal(_))));
        store.set_fail_head(false);
        assert!(store.head("k").await.is_ok());
    }
}
