//! Contracts for the document-store collaborators: year configuration and
//! the media catalog.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::media::MediaItem;
use crate::types::Year;

/// A store's native pagination key: a small map naming the last-seen sort
/// position (e.g. `year`, `createdAt`, `mediaId`).
pub type PageKey = BTreeMap<String, String>;

/// The gallery-protection part of a year's configuration.
///
/// `password_hash` and `token_secret` are set and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryProtection {
    pub year: Year,
    pub password_hash: Option<String>,
    pub token_secret: Option<String>,
}

impl GalleryProtection {
    /// An unprotected (open) gallery.
    pub fn open(year: Year) -> Self {
        Self {
            year,
            password_hash: None,
            token_secret: None,
        }
    }

    /// A password-protected gallery.
    pub fn protected(year: Year, password_hash: String, token_secret: String) -> Self {
        Self {
            year,
            password_hash: Some(password_hash),
            token_secret: Some(token_secret),
        }
    }

    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Year configuration lookup and the administrative protection update.
#[async_trait]
pub trait YearConfigStore: Send + Sync {
    /// Load a year's protection. `None` means the year is unknown, which is
    /// distinct from a known, unprotected year.
    async fn find_protection(&self, year: Year) -> Result<Option<GalleryProtection>, CoreError>;

    /// Replace a year's protection. Returns `false` if the year is unknown.
    async fn set_protection(&self, protection: &GalleryProtection) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Which index a catalog query runs against. Both are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaIndex {
    /// All media of the year, ordered by creation time.
    Year,
    /// Media tagged with one event, ordered by creation time.
    Event(String),
}

/// One page request against a catalog index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub year: Year,
    pub index: MediaIndex,
    pub limit: usize,
    /// Resume strictly after this position. `None` starts from the top.
    pub start_after: Option<PageKey>,
}

/// One page of results plus the key to resume from, if more rows exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_key: Option<PageKey>,
}

/// The media catalog: point access by `(year, media_id)` and index-scoped
/// range queries.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    async fn get(&self, year: Year, media_id: &str) -> Result<Option<MediaItem>, CoreError>;

    /// Write `item`, replacing every field of an existing record except its
    /// original `created_at`.
    async fn put(&self, item: &MediaItem) -> Result<(), CoreError>;

    /// Write only `media_type`, `original_key`, `status` and `updated_at`,
    /// creating the record from `item` if it does not exist yet. Other fields
    /// of an existing record are left alone.
    async fn upsert_minimal(&self, item: &MediaItem) -> Result<(), CoreError>;

    /// Returns `true` if a record was removed.
    async fn delete(&self, year: Year, media_id: &str) -> Result<bool, CoreError>;

    async fn query(&self, query: &IndexQuery) -> Result<Page<MediaItem>, CoreError>;
}
