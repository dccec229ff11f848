//! Gallery media items: types, limits, and storage-key layout.
//!
//! Storage keys live under a year- and media-scoped namespace:
//!
//! ```text
//! {year}/originals/{media_id}.{ext}
//! {year}/thumbnails/{media_id}.{ext}
//! {year}/displays/{media_id}.{ext}     (images only)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::PageKey;
use crate::types::{Timestamp, Year};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted image original (20 MiB).
pub const MAX_IMAGE_BYTES: i64 = 20 * 1024 * 1024;

/// Largest accepted video original (100 MiB).
pub const MAX_VIDEO_BYTES: i64 = 100 * 1024 * 1024;

/// Lifetime of an upload (write) permission.
pub const UPLOAD_URL_TTL_SECS: u64 = 15 * 60;

/// Lifetime of a download (read) permission.
pub const READ_URL_TTL_SECS: u64 = 60 * 60;

/// Extension used for thumbnails and display renditions when the client
/// does not say otherwise.
pub const DEFAULT_PREVIEW_EXT: &str = "jpg";

/// Prefix of every generated media id.
pub const MEDIA_ID_PREFIX: &str = "media-";

/// Original-file extensions classified as images. Anything else is a video.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "avif", "bmp", "tif", "tiff",
];

pub const ORIGINALS_DIR: &str = "originals";
pub const THUMBNAILS_DIR: &str = "thumbnails";
pub const DISPLAYS_DIR: &str = "displays";

/// Longest extension accepted from a file name or client hint.
const MAX_EXTENSION_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Parse the wire / database name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(CoreError::Validation(format!(
                "Invalid type '{other}'. Must be one of: image, video"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Classify a (lowercase) original-file extension.
    pub fn from_extension(ext: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else {
            Self::Video
        }
    }

    /// Size ceiling for an original of this type.
    pub fn max_bytes(self) -> i64 {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Video => MAX_VIDEO_BYTES,
        }
    }

    /// Whether this type gets a display rendition besides the thumbnail.
    pub fn has_display(self) -> bool {
        matches!(self, Self::Image)
    }
}

/// Lifecycle of a catalog record.
///
/// `Pending` is the provisional record written before the upload lands,
/// `Ready` the reconciled record, `Degraded` the minimal record written when
/// reconciliation could not read the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Pending,
    Ready,
    Degraded,
}

impl MediaStatus {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "degraded" => Ok(Self::Degraded),
            other => Err(CoreError::Internal(format!("Unknown media status '{other}'"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Cross-reference labels bundled for query convenience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<String>,
    #[serde(default)]
    pub persons: Vec<String>,
}

/// A catalog entry for one gallery photo or video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub year: Year,
    pub media_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub status: MediaStatus,
    pub original_key: String,
    pub thumbnail_key: Option<String>,
    pub display_key: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub event_id: Option<String>,
    /// Canonical single team reference (first of `team_ids` when present).
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_ids: Vec<String>,
    #[serde(default)]
    pub tags: MediaTags,
    pub uploaded_by: Option<String>,
    pub caption: Option<String>,
    pub original_file_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MediaItem {
    /// A bare record carrying only the fields every entry must have.
    pub fn minimal(
        year: Year,
        media_id: &str,
        media_type: MediaType,
        original_key: &str,
        status: MediaStatus,
        now: Timestamp,
    ) -> Self {
        Self {
            year,
            media_id: media_id.to_string(),
            media_type,
            status,
            original_key: original_key.to_string(),
            thumbnail_key: None,
            display_key: None,
            mime_type: None,
            file_size: None,
            event_id: None,
            team_id: None,
            team_ids: Vec::new(),
            tags: MediaTags::default(),
            uploaded_by: None,
            caption: None,
            original_file_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild the cross-reference part of `tags` from the top-level fields.
    pub fn sync_tags(&mut self) {
        self.tags.event_id = self.event_id.clone();
        self.tags.team_id = self.team_id.clone();
        self.tags.team_ids = self.team_ids.clone();
    }

    /// True when at least one preview rendition (thumbnail or display) exists.
    pub fn has_preview(&self) -> bool {
        self.thumbnail_key.is_some() || self.display_key.is_some()
    }

    /// True when any of `team_ids` appears in the team list or the legacy
    /// single team field.
    pub fn matches_any_team(&self, team_ids: &[String]) -> bool {
        team_ids.iter().any(|wanted| {
            self.team_ids.iter().any(|t| t == wanted)
                || self.team_id.as_deref() == Some(wanted.as_str())
        })
    }

    /// Case-insensitive substring match against the tagged persons.
    pub fn matches_person(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.tags
            .persons
            .iter()
            .any(|p| p.to_lowercase().contains(&needle))
    }

    /// Every storage key this record references.
    pub fn storage_keys(&self) -> Vec<&str> {
        let mut keys = vec![self.original_key.as_str()];
        keys.extend(self.thumbnail_key.as_deref());
        keys.extend(self.display_key.as_deref());
        keys
    }

    /// Pagination key of this record in the year-ordered-by-time index.
    pub fn year_index_key(&self) -> PageKey {
        PageKey::from([
            ("year".to_string(), self.year.to_string()),
            ("createdAt".to_string(), self.created_at.to_rfc3339()),
            ("mediaId".to_string(), self.media_id.clone()),
        ])
    }

    /// Pagination key of this record in the event index.
    pub fn event_index_key(&self) -> PageKey {
        let mut key = self.year_index_key();
        if let Some(event_id) = &self.event_id {
            key.insert("eventId".to_string(), event_id.clone());
        }
        key
    }
}

// ---------------------------------------------------------------------------
// Identifiers and keys
// ---------------------------------------------------------------------------

/// Generate a new opaque, time-ordered media id.
pub fn generate_media_id() -> String {
    format!("{MEDIA_ID_PREFIX}{}", uuid::Uuid::now_v7().simple())
}

/// The storage keys allocated for one media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetKeys {
    pub original: String,
    pub thumbnail: String,
    pub display: Option<String>,
}

/// Derive the storage keys for a media item.
pub fn asset_keys(
    year: Year,
    media_id: &str,
    media_type: MediaType,
    original_ext: &str,
    thumbnail_ext: &str,
    display_ext: &str,
) -> AssetKeys {
    AssetKeys {
        original: format!("{year}/{ORIGINALS_DIR}/{media_id}.{original_ext}"),
        thumbnail: format!("{year}/{THUMBNAILS_DIR}/{media_id}.{thumbnail_ext}"),
        display: media_type
            .has_display()
            .then(|| format!("{year}/{DISPLAYS_DIR}/{media_id}.{display_ext}")),
    }
}

/// The parts of an `{year}/originals/{file}` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalKey {
    pub year: Year,
    pub media_id: String,
    /// Lowercased extension; empty when the file name has none.
    pub ext: String,
}

/// Parse an originals-namespace key. Returns `None` for anything else.
pub fn parse_original_key(key: &str) -> Option<OriginalKey> {
    let segments: Vec<&str> = key.split('/').collect();
    let [year, dir, file_name] = segments.as_slice() else {
        return None;
    };
    if *dir != ORIGINALS_DIR || year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: Year = year.parse().ok()?;

    let (media_id, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_lowercase()),
        None => (*file_name, String::new()),
    };
    if media_id.is_empty() {
        return None;
    }

    Some(OriginalKey {
        year,
        media_id: media_id.to_string(),
        ext,
    })
}

/// Normalise an extension (`".JPG"` -> `"jpg"`). Rejects anything that is
/// not a short ASCII-alphanumeric token.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Extension of a file name, normalised.
pub fn extension_from_file_name(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .and_then(|(_, ext)| normalize_extension(ext))
}

/// Extension implied by a MIME type (`image/jpeg` -> `jpeg`).
pub fn extension_from_mime(mime_type: &str) -> Option<String> {
    let subtype = mime_type.split_once('/')?.1;
    let subtype = subtype.split(';').next().unwrap_or_default();
    let subtype = subtype.rsplit('+').last().unwrap_or(subtype);
    match subtype.trim().to_ascii_lowercase().as_str() {
        "quicktime" => Some("mov".to_string()),
        other => normalize_extension(other),
    }
}

/// Resolve a client thumbnail/display extension hint, falling back to
/// [`DEFAULT_PREVIEW_EXT`].
pub fn preview_extension(hint: Option<&str>) -> String {
    hint.and_then(normalize_extension)
        .unwrap_or_else(|| DEFAULT_PREVIEW_EXT.to_string())
}

/// Check an original's declared size against its type's ceiling.
pub fn validate_file_size(media_type: MediaType, file_size: i64) -> Result<(), CoreError> {
    if file_size < 0 {
        return Err(CoreError::Validation(
            "fileSize must not be negative".to_string(),
        ));
    }
    let max = media_type.max_bytes();
    if file_size > max {
        return Err(CoreError::Validation(format!(
            "fileSize {file_size} exceeds the {} limit of {max} bytes",
            media_type.name()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
