//! Upload Coordinator.
//!
//! Issues write permissions for a new media item and records it as pending.
//! No bytes pass through the server. The client uploads the thumbnail (and
//! display rendition, for images) first and the original last; the original
//! carries the descriptive metadata that the reconciler reads back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fieldday_core::error::CoreError;
use fieldday_core::media::{
    asset_keys, extension_from_file_name, extension_from_mime, generate_media_id,
    preview_extension, validate_file_size, MediaItem, MediaStatus, MediaType,
    UPLOAD_URL_TTL_SECS,
};
use fieldday_core::metadata::{clean_label, clean_list, EmbeddedMetadata, MAX_CAPTION_LEN, MAX_LABEL_LEN};
use fieldday_core::storage::{ObjectStore, PresignedUpload};
use fieldday_core::store::MediaCatalog;
use fieldday_core::types::Year;
use serde::{Deserialize, Serialize};

/// Body of `POST /gallery/{year}/media/upload`.
///
/// Every field is optional at the serde level so that missing required
/// fields produce one validation message naming all of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub event_id: Option<String>,
    pub team_id: Option<String>,
    pub team_ids: Option<Vec<String>>,
    pub persons: Option<Vec<String>>,
    pub uploaded_by: Option<String>,
    pub caption: Option<String>,
    /// Extension of the thumbnail the client will upload (default `jpg`).
    pub thumbnail_ext: Option<String>,
    /// Extension of the display rendition (images only, default `jpg`).
    pub display_ext: Option<String>,
}

/// One write permission together with the key it writes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpload {
    pub key: String,
    #[serde(flatten)]
    pub permission: PresignedUpload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUploads {
    pub original: AssetUpload,
    pub thumbnail: AssetUpload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<AssetUpload>,
}

/// What the client gets back: the new id and where to put each asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    pub media_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub uploads: AssetUploads,
}

/// A request that passed validation.
struct ValidUpload {
    file_name: String,
    file_size: i64,
    mime_type: String,
    media_type: MediaType,
    original_ext: String,
    metadata: EmbeddedMetadata,
}

pub struct UploadCoordinator {
    catalog: Arc<dyn MediaCatalog>,
    objects: Arc<dyn ObjectStore>,
}

impl UploadCoordinator {
    pub fn new(catalog: Arc<dyn MediaCatalog>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { catalog, objects }
    }

    /// Validate the request, allocate keys, issue write permissions and
    /// store the provisional record.
    pub async fn request_upload(
        &self,
        year: Year,
        request: UploadRequest,
    ) -> Result<UploadGrant, CoreError> {
        let upload = validate(request)?;
        let media_id = generate_media_id();
        let keys = asset_keys(
            year,
            &media_id,
            upload.media_type,
            &upload.original_ext,
            &upload.metadata.thumbnail_ext,
            &upload.metadata.display_ext,
        );
        let ttl = Duration::from_secs(UPLOAD_URL_TTL_SECS);

        let original = self
            .permit(
                &keys.original,
                &upload.mime_type,
                &upload.metadata.to_object_metadata(),
                ttl,
            )
            .await?;
        let thumbnail = self
            .permit(
                &keys.thumbnail,
                preview_content_type(&upload.metadata.thumbnail_ext),
                &HashMap::new(),
                ttl,
            )
            .await?;
        let display = match &keys.display {
            Some(key) => Some(
                self.permit(
                    key,
                    preview_content_type(&upload.metadata.display_ext),
                    &HashMap::new(),
                    ttl,
                )
                .await?,
            ),
            None => None,
        };

        let mut item = MediaItem::minimal(
            year,
            &media_id,
            upload.media_type,
            &keys.original,
            MediaStatus::Pending,
            Utc::now(),
        );
        item.thumbnail_key = Some(keys.thumbnail.clone());
        item.display_key = keys.display.clone();
        item.mime_type = Some(upload.mime_type);
        item.file_size = Some(upload.file_size);
        item.original_file_name = Some(upload.file_name);
        item.team_id = upload.metadata.canonical_team_id();
        item.event_id = upload.metadata.event_id;
        item.team_ids = upload.metadata.team_ids;
        item.tags.persons = upload.metadata.persons;
        item.uploaded_by = upload.metadata.uploaded_by;
        item.caption = upload.metadata.caption;
        item.sync_tags();
        self.catalog.put(&item).await?;

        tracing::info!(
            year,
            media_id = %media_id,
            media_type = upload.media_type.name(),
            file_size = upload.file_size,
            "Issued upload permissions"
        );

        Ok(UploadGrant {
            media_id,
            media_type: upload.media_type,
            uploads: AssetUploads {
                original,
                thumbnail,
                display,
            },
        })
    }

    async fn permit(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<AssetUpload, CoreError> {
        let permission = self
            .objects
            .presign_put(key, content_type, metadata, ttl)
            .await?;
        Ok(AssetUpload {
            key: key.to_string(),
            permission,
        })
    }
}

/// Missing fields first, then the type, then the size.
fn validate(request: UploadRequest) -> Result<ValidUpload, CoreError> {
    let file_name = request
        .file_name
        .as_deref()
        .and_then(|v| clean_label(v, MAX_LABEL_LEN));
    let mime_type = request
        .mime_type
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_ascii_lowercase);
    let media_type = request
        .media_type
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let missing: Vec<&str> = [
        ("fileName", file_name.is_none()),
        ("fileSize", request.file_size.is_none()),
        ("mimeType", mime_type.is_none()),
        ("type", media_type.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    let (Some(file_name), Some(file_size), Some(mime_type), Some(media_type)) =
        (file_name, request.file_size, mime_type, media_type)
    else {
        return Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    let media_type = MediaType::from_name(media_type)?;
    validate_file_size(media_type, file_size)?;

    let original_ext = extension_from_file_name(&file_name)
        .or_else(|| extension_from_mime(&mime_type))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Cannot determine a file extension from fileName '{file_name}'"
            ))
        })?;

    let team_ids = clean_list(request.team_ids.unwrap_or_default());
    let metadata = EmbeddedMetadata {
        event_id: request
            .event_id
            .as_deref()
            .and_then(|v| clean_label(v, MAX_LABEL_LEN)),
        team_id: request
            .team_id
            .as_deref()
            .and_then(|v| clean_label(v, MAX_LABEL_LEN)),
        team_ids,
        persons: clean_list(request.persons.unwrap_or_default()),
        uploaded_by: request
            .uploaded_by
            .as_deref()
            .and_then(|v| clean_label(v, MAX_LABEL_LEN)),
        caption: request
            .caption
            .as_deref()
            .and_then(|v| clean_label(v, MAX_CAPTION_LEN)),
        original_file_name: Some(file_name.clone()),
        thumbnail_ext: preview_extension(request.thumbnail_ext.as_deref()),
        display_ext: preview_extension(request.display_ext.as_deref()),
    };

    Ok(ValidUpload {
        file_name,
        file_size,
        mime_type,
        media_type,
        original_ext,
        metadata,
    })
}

/// Content type a preview rendition is uploaded with.
fn preview_content_type(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
