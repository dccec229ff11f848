//! S3 object store.
//!
//! Credentials and region come from the standard AWS provider chain
//! (environment, profile, instance metadata). `AWS_ENDPOINT_URL` points the
//! client at an S3-compatible service such as MinIO.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use fieldday_core::error::CoreError;
use fieldday_core::storage::{ObjectAttributes, ObjectStore, PresignedUpload};

/// Gallery assets stored in one S3 bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default AWS configuration chain.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn presigning_config(ttl: Duration) -> Result<PresigningConfig, CoreError> {
    PresigningConfig::expires_in(ttl)
        .map_err(|e| CoreError::Internal(format!("invalid presigning TTL {ttl:?}: {e}")))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<PresignedUpload, CoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type);
        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        let presigned = request
            .presigned(presigning_config(ttl)?)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "presign PUT {key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let headers: BTreeMap<String, String> = presigned
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            method: "PUT",
            headers,
            expires_in_secs: ttl.as_secs(),
        })
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CoreError> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config(ttl)?)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "presign GET {key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(presigned.uri().to_string())
    }

    async fn head(&self, key: &str) -> Result<ObjectAttributes, CoreError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service) if service.is_not_found() => CoreError::not_found("StoredObject", key),
                _ => CoreError::Internal(format!(
                    "HEAD {key} failed: {}",
                    DisplayErrorContext(&e)
                )),
            })?;

        Ok(ObjectAttributes {
            content_type: output.content_type().map(str::to_string),
            size: output.content_length(),
            metadata: output.metadata().cloned().unwrap_or_default(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "DELETE {key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        tracing::debug!(bucket = %self.bucket, key, "Deleted object");
        Ok(())
    }
}
