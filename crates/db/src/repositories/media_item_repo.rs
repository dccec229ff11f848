//! Repository for the `gallery_media` table.

use async_trait::async_trait;
use fieldday_core::error::CoreError;
use fieldday_core::media::MediaItem;
use fieldday_core::store::{IndexQuery, MediaCatalog, MediaIndex, Page, PageKey};
use fieldday_core::types::{Timestamp, Year};
use sqlx::PgPool;

use crate::models::media_item::MediaItemRow;
use crate::repositories::internal;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "year, media_id, media_type, status, original_key, thumbnail_key, \
    display_key, mime_type, file_size, event_id, team_id, team_ids, persons, uploaded_by, \
    caption, original_file_name, created_at, updated_at";

/// A resume position decoded from a [`PageKey`]: rows strictly after
/// `(created_at, media_id)` in newest-first order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePosition {
    pub created_at: Timestamp,
    pub media_id: String,
}

impl PagePosition {
    /// Read a position out of a page key. Keys missing either field, or with
    /// an unparsable timestamp, mean "from the top".
    pub fn from_key(key: Option<&PageKey>) -> Option<Self> {
        let key = key?;
        let created_at = chrono::DateTime::parse_from_rfc3339(key.get("createdAt")?)
            .ok()?
            .with_timezone(&chrono::Utc);
        let media_id = key.get("mediaId")?.clone();
        Some(Self {
            created_at,
            media_id,
        })
    }

    /// True if `item` sorts strictly after this position (newest first).
    pub fn precedes(&self, item: &MediaItem) -> bool {
        (item.created_at, item.media_id.as_str()) < (self.created_at, self.media_id.as_str())
    }
}

/// The page key of `item` in the index a query runs against.
pub fn index_key(index: &MediaIndex, item: &MediaItem) -> PageKey {
    match index {
        MediaIndex::Year => item.year_index_key(),
        MediaIndex::Event(_) => item.event_index_key(),
    }
}

/// Provides catalog operations for gallery media.
pub struct MediaItemRepo;

impl MediaItemRepo {
    /// Find one item by its composite key.
    pub async fn find(
        pool: &PgPool,
        year: Year,
        media_id: &str,
    ) -> Result<Option<MediaItemRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM gallery_media WHERE year = $1 AND media_id = $2");
        sqlx::query_as::<_, MediaItemRow>(&query)
            .bind(year)
            .bind(media_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or fully replace an item. An existing row keeps its `created_at`.
    pub async fn upsert(pool: &PgPool, item: &MediaItem) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO gallery_media
                (year, media_id, media_type, status, original_key, thumbnail_key, display_key,
                 mime_type, file_size, event_id, team_id, team_ids, persons, uploaded_by,
                 caption, original_file_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             ON CONFLICT (year, media_id) DO UPDATE SET
                media_type = EXCLUDED.media_type,
                status = EXCLUDED.status,
                original_key = EXCLUDED.original_key,
                thumbnail_key = EXCLUDED.thumbnail_key,
                display_key = EXCLUDED.display_key,
                mime_type = EXCLUDED.mime_type,
                file_size = EXCLUDED.file_size,
                event_id = EXCLUDED.event_id,
                team_id = EXCLUDED.team_id,
                team_ids = EXCLUDED.team_ids,
                persons = EXCLUDED.persons,
                uploaded_by = EXCLUDED.uploaded_by,
                caption = EXCLUDED.caption,
                original_file_name = EXCLUDED.original_file_name,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(item.year)
        .bind(&item.media_id)
        .bind(item.media_type.name())
        .bind(item.status.name())
        .bind(&item.original_key)
        .bind(&item.thumbnail_key)
        .bind(&item.display_key)
        .bind(&item.mime_type)
        .bind(item.file_size)
        .bind(&item.event_id)
        .bind(&item.team_id)
        .bind(&item.team_ids)
        .bind(&item.tags.persons)
        .bind(&item.uploaded_by)
        .bind(&item.caption)
        .bind(&item.original_file_name)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert a bare row, or refresh only the core columns of an existing one.
    pub async fn upsert_minimal(pool: &PgPool, item: &MediaItem) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO gallery_media
                (year, media_id, media_type, status, original_key, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (year, media_id) DO UPDATE SET
                media_type = EXCLUDED.media_type,
                status = EXCLUDED.status,
                original_key = EXCLUDED.original_key,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(item.year)
        .bind(&item.media_id)
        .bind(item.media_type.name())
        .bind(item.status.name())
        .bind(&item.original_key)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Permanently delete an item. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, year: Year, media_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM gallery_media WHERE year = $1 AND media_id = $2")
            .bind(year)
            .bind(media_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Keyset page over the year index (`event_id = None`) or the event index.
    ///
    /// Ordered newest first; returns at most `fetch` rows after `after`.
    pub async fn list_page(
        pool: &PgPool,
        year: Year,
        event_id: Option<&str>,
        after: Option<&PagePosition>,
        fetch: i64,
    ) -> Result<Vec<MediaItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM gallery_media
             WHERE year = $1
               AND ($2::text IS NULL OR event_id = $2)
               AND ($3::timestamptz IS NULL OR (created_at, media_id) < ($3, $4::text))
             ORDER BY created_at DESC, media_id DESC
             LIMIT $5"
        );
        sqlx::query_as::<_, MediaItemRow>(&query)
            .bind(year)
            .bind(event_id)
            .bind(after.map(|p| p.created_at))
            .bind(after.map(|p| p.media_id.as_str()))
            .bind(fetch)
            .fetch_all(pool)
            .await
    }
}

/// [`MediaCatalog`] backed by Postgres.
#[derive(Clone)]
pub struct PgMediaCatalog {
    pool: PgPool,
}

impl PgMediaCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaCatalog for PgMediaCatalog {
    async fn get(&self, year: Year, media_id: &str) -> Result<Option<MediaItem>, CoreError> {
        MediaItemRepo::find(&self.pool, year, media_id)
            .await
            .map_err(internal("load media item"))?
            .map(MediaItem::try_from)
            .transpose()
    }

    async fn put(&self, item: &MediaItem) -> Result<(), CoreError> {
        MediaItemRepo::upsert(&self.pool, item)
            .await
            .map_err(internal("write media item"))
    }

    async fn upsert_minimal(&self, item: &MediaItem) -> Result<(), CoreError> {
        MediaItemRepo::upsert_minimal(&self.pool, item)
            .await
            .map_err(internal("write minimal media item"))
    }

    async fn delete(&self, year: Year, media_id: &str) -> Result<bool, CoreError> {
        MediaItemRepo::delete(&self.pool, year, media_id)
            .await
            .map_err(internal("delete media item"))
    }

    async fn query(&self, query: &IndexQuery) -> Result<Page<MediaItem>, CoreError> {
        let after = PagePosition::from_key(query.start_after.as_ref());
        let event_id = match &query.index {
            MediaIndex::Year => None,
            MediaIndex::Event(id) => Some(id.as_str()),
        };
        // One extra row tells us whether another page exists.
        let fetch = i64::try_from(query.limit).unwrap_or(i64::MAX - 1) + 1;

        let rows = MediaItemRepo::list_page(&self.pool, query.year, event_id, after.as_ref(), fetch)
            .await
            .map_err(internal("query media index"))?;

        let mut items = rows
            .into_iter()
            .map(MediaItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let next_key = if items.len() > query.limit {
            items.truncate(query.limit);
            items.last().map(|last| index_key(&query.index, last))
        } else {
            None
        };

        Ok(Page { items, next_key })
    }
}
