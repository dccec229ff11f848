//! Catalog Query Service: get, list, edit and delete media items.
//!
//! Every item handed to a client carries short-lived read URLs for the
//! assets it references.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fieldday_core::cursor::{decode_cursor, encode_cursor};
use fieldday_core::error::CoreError;
use fieldday_core::media::{MediaItem, READ_URL_TTL_SECS};
use fieldday_core::metadata::{clean_label, clean_list, MAX_CAPTION_LEN};
use fieldday_core::pagination::{clamp_limit, overfetch_page, OVERFETCH_MULTIPLIER};
use fieldday_core::storage::ObjectStore;
use fieldday_core::store::{IndexQuery, MediaCatalog, MediaIndex, Page};
use fieldday_core::types::Year;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

/// Query parameters of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub event_id: Option<String>,
    /// One or more team ids, comma-separated.
    pub team_id: Option<String>,
    /// Case-insensitive substring of a tagged person.
    pub person: Option<String>,
    pub limit: Option<i64>,
    pub next_token: Option<String>,
}

/// Body of the edit endpoint. Absent fields are left alone; an empty
/// caption clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpdate {
    pub caption: Option<String>,
    pub persons: Option<Vec<String>>,
}

/// A media item with read URLs attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaView {
    #[serde(flatten)]
    pub item: MediaItem,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    pub items: Vec<MediaView>,
    pub next_token: Option<String>,
}

pub struct CatalogQueryService {
    catalog: Arc<dyn MediaCatalog>,
    objects: Arc<dyn ObjectStore>,
}

impl CatalogQueryService {
    pub fn new(catalog: Arc<dyn MediaCatalog>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { catalog, objects }
    }

    pub async fn get(&self, year: Year, media_id: &str) -> Result<MediaView, CoreError> {
        let item = self.find(year, media_id).await?;
        self.sign(item).await
    }

    /// List one page of previewable items, newest first.
    ///
    /// `eventId` wins over `teamId`; a team filter scans the year index with
    /// overfetch and filters in process.
    pub async fn list(&self, year: Year, params: &ListParams) -> Result<MediaPage, CoreError> {
        let limit = clamp_limit(params.limit);
        let start_after = decode_cursor(params.next_token.as_deref());
        let event_id = params
            .event_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let team_ids = split_team_ids(params.team_id.as_deref());

        let page = match (event_id, team_ids.is_empty()) {
            (Some(event_id), _) => {
                self.catalog
                    .query(&IndexQuery {
                        year,
                        index: MediaIndex::Event(event_id.to_string()),
                        limit,
                        start_after,
                    })
                    .await?
            }
            (None, false) => {
                let raw = self
                    .catalog
                    .query(&IndexQuery {
                        year,
                        index: MediaIndex::Year,
                        limit: limit.saturating_mul(OVERFETCH_MULTIPLIER),
                        start_after,
                    })
                    .await?;
                overfetch_page(
                    raw,
                    limit,
                    |item| item.matches_any_team(&team_ids),
                    MediaItem::year_index_key,
                )
            }
            (None, true) => {
                self.catalog
                    .query(&IndexQuery {
                        year,
                        index: MediaIndex::Year,
                        limit,
                        start_after,
                    })
                    .await?
            }
        };

        let Page { items, next_key } = page;
        let person = params
            .person
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let visible = items
            .into_iter()
            .filter(MediaItem::has_preview)
            .filter(|item| person.map_or(true, |p| item.matches_person(p)));

        let items = try_join_all(visible.map(|item| self.sign(item))).await?;
        Ok(MediaPage {
            items,
            next_token: next_key.as_ref().map(encode_cursor),
        })
    }

    /// Apply a caption/persons edit.
    pub async fn update(
        &self,
        year: Year,
        media_id: &str,
        update: MediaUpdate,
    ) -> Result<MediaView, CoreError> {
        if update.caption.is_none() && update.persons.is_none() {
            return Err(CoreError::Validation(
                "Nothing to update: provide caption and/or persons".into(),
            ));
        }

        let mut item = self.find(year, media_id).await?;
        if let Some(caption) = update.caption {
            item.caption = clean_label(&caption, MAX_CAPTION_LEN);
        }
        if let Some(persons) = update.persons {
            item.tags.persons = clean_list(persons);
        }
        item.updated_at = Utc::now();
        self.catalog.put(&item).await?;

        tracing::info!(year, media_id, "Updated media item");
        self.sign(item).await
    }

    /// Delete the stored objects, then the record. Object deletion is
    /// best effort.
    pub async fn delete(&self, year: Year, media_id: &str) -> Result<(), CoreError> {
        let item = self.find(year, media_id).await?;

        for key in item.storage_keys() {
            if let Err(err) = self.objects.delete(key).await {
                tracing::warn!(key, error = %err, "Failed to delete stored object");
            }
        }
        if !self.catalog.delete(year, media_id).await? {
            return Err(CoreError::not_found("MediaItem", media_id));
        }

        tracing::info!(year, media_id, "Deleted media item");
        Ok(())
    }

    async fn find(&self, year: Year, media_id: &str) -> Result<MediaItem, CoreError> {
        self.catalog
            .get(year, media_id)
            .await?
            .ok_or_else(|| CoreError::not_found("MediaItem", media_id))
    }

    async fn sign(&self, item: MediaItem) -> Result<MediaView, CoreError> {
        let ttl = Duration::from_secs(READ_URL_TTL_SECS);
        let original_url = self.objects.presign_get(&item.original_key, ttl).await?;
        let thumbnail_url = match &item.thumbnail_key {
            Some(key) => Some(self.objects.presign_get(key, ttl).await?),
            None => None,
        };
        let display_url = match &item.display_key {
            Some(key) => Some(self.objects.presign_get(key, ttl).await?),
            None => None,
        };
        Ok(MediaView {
            item,
            original_url,
            thumbnail_url,
            display_url,
        })
    }
}

fn split_team_ids(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
