//! Asset Reconciler.
//!
//! Runs when the object store reports a new object under
//! `{year}/originals/`. Reads the object's attributes back, derives the
//! sibling keys and writes the canonical catalog record. Nothing here returns
//! an error to a caller: failures degrade to a minimal record, and failures
//! of that write are logged and dropped. There is no retry.

use std::sync::Arc;

use chrono::Utc;
use fieldday_core::error::CoreError;
use fieldday_core::media::{
    asset_keys, parse_original_key, MediaItem, MediaStatus, MediaType, OriginalKey,
};
use fieldday_core::metadata::EmbeddedMetadata;
use fieldday_core::storage::ObjectStore;
use fieldday_core::store::MediaCatalog;
use fieldday_core::types::Year;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Notification payload
// ---------------------------------------------------------------------------

/// S3-style object-created notification. Only the object keys are read;
/// records without one are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageEventRecord {
    #[serde(default)]
    pub s3: Option<S3Entity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub object: Option<S3Object>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Object {
    #[serde(default)]
    pub key: Option<String>,
}

impl StorageEvent {
    /// Decoded object keys, in delivery order. Keys arrive form-encoded
    /// (`+` for space); a key whose escapes do not decode is kept as sent.
    pub fn object_keys(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.s3.as_ref()?.object.as_ref()?.key.as_deref())
            .map(|raw| {
                let spaced = raw.replace('+', " ");
                let decoded = urlencoding::decode(&spaced).map(|d| d.into_owned());
                decoded.unwrap_or(spaced)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// What happened to one notified object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Not an originals key.
    Skipped,
    /// Canonical record written.
    Reconciled { year: Year, media_id: String },
    /// Enrichment failed; a minimal record was written instead.
    Degraded { year: Year, media_id: String },
    /// Both writes failed. Only the logs know about this object.
    Lost { year: Year, media_id: String },
}

pub struct AssetReconciler {
    catalog: Arc<dyn MediaCatalog>,
    objects: Arc<dyn ObjectStore>,
}

impl AssetReconciler {
    pub fn new(catalog: Arc<dyn MediaCatalog>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { catalog, objects }
    }

    /// Reconcile every key, one after the other.
    pub async fn reconcile_keys(&self, keys: &[String]) -> Vec<ReconcileOutcome> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            outcomes.push(self.reconcile_key(key).await);
        }
        outcomes
    }

    pub async fn reconcile_key(&self, key: &str) -> ReconcileOutcome {
        let Some(parsed) = parse_original_key(key) else {
            tracing::warn!(key, "Skipping object outside the originals namespace");
            return ReconcileOutcome::Skipped;
        };
        let media_type = MediaType::from_extension(&parsed.ext);
        let OriginalKey { year, media_id, .. } = parsed.clone();

        match self.enrich(&parsed, media_type, key).await {
            Ok(()) => {
                tracing::info!(key, year, media_id = %media_id, "Reconciled media item");
                ReconcileOutcome::Reconciled { year, media_id }
            }
            Err(err) => {
                tracing::error!(key, error = %err, "Reconciliation failed, writing minimal record");
                let minimal = MediaItem::minimal(
                    year,
                    &media_id,
                    media_type,
                    key,
                    MediaStatus::Degraded,
                    Utc::now(),
                );
                match self.catalog.upsert_minimal(&minimal).await {
                    Ok(()) => ReconcileOutcome::Degraded { year, media_id },
                    Err(err) => {
                        tracing::error!(key, error = %err, "Minimal record write failed, media item lost");
                        ReconcileOutcome::Lost { year, media_id }
                    }
                }
            }
        }
    }

    async fn enrich(
        &self,
        parsed: &OriginalKey,
        media_type: MediaType,
        key: &str,
    ) -> Result<(), CoreError> {
        let attributes = self.objects.head(key).await?;
        let metadata = EmbeddedMetadata::from_object_metadata(&attributes.metadata);
        let keys = asset_keys(
            parsed.year,
            &parsed.media_id,
            media_type,
            &parsed.ext,
            &metadata.thumbnail_ext,
            &metadata.display_ext,
        );

        let mut item = MediaItem::minimal(
            parsed.year,
            &parsed.media_id,
            media_type,
            key,
            MediaStatus::Ready,
            Utc::now(),
        );
        item.thumbnail_key = Some(keys.thumbnail);
        item.display_key = keys.display;
        item.mime_type = attributes.content_type;
        item.file_size = attributes.size;
        item.team_id = metadata.canonical_team_id();
        item.event_id = metadata.event_id;
        item.team_ids = metadata.team_ids;
        item.tags.persons = metadata.persons;
        item.uploaded_by = metadata.uploaded_by;
        item.caption = metadata.caption;
        item.original_file_name = metadata.original_file_name;
        item.sync_tags();

        self.catalog.put(&item).await
    }
}
