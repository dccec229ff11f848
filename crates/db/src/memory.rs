//! In-process stores implementing the same contracts as the Postgres
//! repositories. Used for local development (`GALLERY_BACKEND=memory`) and
//! by the test suites.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use fieldday_core::error::CoreError;
use fieldday_core::media::MediaItem;
use fieldday_core::store::{
    GalleryProtection, IndexQuery, MediaCatalog, MediaIndex, Page, YearConfigStore,
};
use fieldday_core::types::Year;
use tokio::sync::RwLock;

use crate::repositories::media_item_repo::{index_key, PagePosition};

// ---------------------------------------------------------------------------
// Year configuration
// ---------------------------------------------------------------------------

/// Year configurations held in memory.
#[derive(Default)]
pub struct InMemoryYearConfigs {
    years: RwLock<HashMap<Year, GalleryProtection>>,
}

impl InMemoryYearConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a year (the part of year administration this subsystem does
    /// not own).
    pub async fn insert(&self, protection: GalleryProtection) {
        self.years.write().await.insert(protection.year, protection);
    }
}

#[async_trait]
impl YearConfigStore for InMemoryYearConfigs {
    async fn find_protection(&self, year: Year) -> Result<Option<GalleryProtection>, CoreError> {
        Ok(self.years.read().await.get(&year).cloned())
    }

    async fn set_protection(&self, protection: &GalleryProtection) -> Result<bool, CoreError> {
        if protection.password_hash.is_some() != protection.token_secret.is_some() {
            return Err(CoreError::Internal(
                "password hash and token secret must be set together".to_string(),
            ));
        }
        let mut years = self.years.write().await;
        match years.get_mut(&protection.year) {
            Some(existing) => {
                *existing = protection.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Media catalog held in memory, keyed by `(year, media_id)`.
#[derive(Default)]
pub struct InMemoryCatalog {
    items: RwLock<BTreeMap<(Year, String), MediaItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all years.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl MediaCatalog for InMemoryCatalog {
    async fn get(&self, year: Year, media_id: &str) -> Result<Option<MediaItem>, CoreError> {
        Ok(self
            .items
            .read()
            .await
            .get(&(year, media_id.to_string()))
            .cloned())
    }

    async fn put(&self, item: &MediaItem) -> Result<(), CoreError> {
        let mut stored = item.clone();
        stored.sync_tags();
        let mut items = self.items.write().await;
        if let Some(existing) = items.get(&(item.year, item.media_id.clone())) {
            stored.created_at = existing.created_at;
        }
        items.insert((item.year, item.media_id.clone()), stored);
        Ok(())
    }

    async fn upsert_minimal(&self, item: &MediaItem) -> Result<(), CoreError> {
        let mut items = self.items.write().await;
        match items.get_mut(&(item.year, item.media_id.clone())) {
            Some(existing) => {
                existing.media_type = item.media_type;
                existing.status = item.status;
                existing.original_key = item.original_key.clone();
                existing.updated_at = item.updated_at;
            }
            None => {
                let mut stored = item.clone();
                stored.sync_tags();
                items.insert((item.year, item.media_id.clone()), stored);
            }
        }
        Ok(())
    }

    async fn delete(&self, year: Year, media_id: &str) -> Result<bool, CoreError> {
        Ok(self
            .items
            .write()
            .await
            .remove(&(year, media_id.to_string()))
            .is_some())
    }

    async fn query(&self, query: &IndexQuery) -> Result<Page<MediaItem>, CoreError> {
        let after = PagePosition::from_key(query.start_after.as_ref());
        let items = self.items.read().await;

        let mut matching: Vec<&MediaItem> = items
            .values()
            .filter(|item| item.year == query.year)
            .filter(|item| match &query.index {
                MediaIndex::Year => true,
                MediaIndex::Event(event_id) => item.event_id.as_deref() == Some(event_id.as_str()),
            })
            .filter(|item| after.as_ref().map_or(true, |p| p.precedes(item)))
            .collect();
        matching.sort_by(|a, b| {
            (b.created_at, b.media_id.as_str()).cmp(&(a.created_at, a.media_id.as_str()))
        });

        let has_more = matching.len() > query.limit;
        let page: Vec<MediaItem> = matching
            .into_iter()
            .take(query.limit)
            .cloned()
            .collect();
        let next_key = if has_more {
            page.last().map(|last| index_key(&query.index, last))
        } else {
            None
        };

        Ok(Page {
            items: page,
            next_key,
        })
    }
}
