//! Contract for the object store holding gallery assets.
//!
//! Clients never stream bytes through the API: they receive short-lived
//! presigned permissions and talk to the object store directly.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;

/// A time-limited write permission for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub url: String,
    /// HTTP method the client must use.
    pub method: &'static str,
    /// Headers the client must send verbatim (they are part of the signature).
    pub headers: BTreeMap<String, String>,
    pub expires_in_secs: u64,
}

/// Attributes of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub content_type: Option<String>,
    pub size: Option<i64>,
    /// User metadata attached at upload time (lowercased keys).
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a write permission for `key`. `metadata` is bound into the
    /// permission and stored as the object's user metadata.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<PresignedUpload, CoreError>;

    /// Issue a read permission (download URL) for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CoreError>;

    /// Fetch a stored object's attributes. A missing object is
    /// [`CoreError::NotFound`].
    async fn head(&self, key: &str) -> Result<ObjectAttributes, CoreError>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}
