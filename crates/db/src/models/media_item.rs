//! Row type for the `gallery_media` table.

use fieldday_core::error::CoreError;
use fieldday_core::media::{MediaItem, MediaStatus, MediaTags, MediaType};
use fieldday_core::types::{Timestamp, Year};
use sqlx::FromRow;

/// A row from the `gallery_media` table.
///
/// The nested `tags` bundle of [`MediaItem`] is not stored separately; it is
/// rebuilt from the cross-reference columns on read.
#[derive(Debug, Clone, FromRow)]
pub struct MediaItemRow {
    pub year: Year,
    pub media_id: String,
    pub media_type: String,
    pub status: String,
    pub original_key: String,
    pub thumbnail_key: Option<String>,
    pub display_key: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub event_id: Option<String>,
    pub team_id: Option<String>,
    pub team_ids: Vec<String>,
    pub persons: Vec<String>,
    pub uploaded_by: Option<String>,
    pub caption: Option<String>,
    pub original_file_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<MediaItemRow> for MediaItem {
    type Error = CoreError;

    fn try_from(row: MediaItemRow) -> Result<Self, Self::Error> {
        let media_type = MediaType::from_name(&row.media_type).map_err(|_| {
            CoreError::Internal(format!(
                "gallery_media {}/{} has unknown media_type '{}'",
                row.year, row.media_id, row.media_type
            ))
        })?;
        let status = MediaStatus::from_name(&row.status)?;

        Ok(MediaItem {
            tags: MediaTags {
                event_id: row.event_id.clone(),
                team_id: row.team_id.clone(),
                team_ids: row.team_ids.clone(),
                persons: row.persons,
            },
            year: row.year,
            media_id: row.media_id,
            media_type,
            status,
            original_key: row.original_key,
            thumbnail_key: row.thumbnail_key,
            display_key: row.display_key,
            mime_type: row.mime_type,
            file_size: row.file_size,
            event_id: row.event_id,
            team_id: row.team_id,
            team_ids: row.team_ids,
            uploaded_by: row.uploaded_by,
            caption: row.caption,
            original_file_name: row.original_file_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
