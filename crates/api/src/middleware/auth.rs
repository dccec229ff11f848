//! Header-based guards for gallery, admin and storage-notification routes.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use fieldday_core::error::CoreError;
use fieldday_core::gallery_token::secrets_match;
use fieldday_core::types::Year;

use crate::error::AppError;
use crate::gallery::parse_year;
use crate::state::AppState;

/// Header carrying the gallery access token.
pub const GALLERY_TOKEN_HEADER: &str = "x-gallery-token";
/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
/// Header carrying the storage notification secret.
pub const STORAGE_EVENT_SECRET_HEADER: &str = "x-storage-event-secret";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Proof that the request passed the Access Guard for the `{year}` in its
/// path.
///
/// ```ignore
/// async fn list(access: GalleryAccess, State(state): State<AppState>) -> AppResult<...> {
///     state.catalog_service().list(access.year, ...).await?;
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GalleryAccess {
    pub year: Year,
}

impl FromRequestParts<AppState> for GalleryAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        let raw_year = params
            .get("year")
            .ok_or_else(|| AppError::BadRequest("Missing year in path".into()))?;
        let year = parse_year(raw_year)?;

        // Accept both a bare token and the `Bearer <token>` form.
        let token = header(parts, GALLERY_TOKEN_HEADER)
            .map(|t| t.strip_prefix("Bearer ").unwrap_or(t));

        state.access_guard().authorize(year, token).await?;
        Ok(GalleryAccess { year })
    }
}

/// Caller presented the configured admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_key.as_deref() else {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin endpoints are disabled".into(),
            )));
        };
        match header(parts, ADMIN_KEY_HEADER) {
            Some(provided) if secrets_match(expected, provided) => Ok(AdminKey),
            _ => Err(AppError::Core(CoreError::Unauthorized(
                "Missing or invalid admin key".into(),
            ))),
        }
    }
}

/// Notification came from the object store. Passes everything when no
/// secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct StorageEventAuth;

impl FromRequestParts<AppState> for StorageEventAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.storage_event_secret.as_deref() else {
            return Ok(StorageEventAuth);
        };
        match header(parts, STORAGE_EVENT_SECRET_HEADER) {
            Some(provided) if secrets_match(expected, provided) => Ok(StorageEventAuth),
            _ => {
                tracing::warn!("Rejected storage notification with a bad secret");
                Err(AppError::Core(CoreError::Unauthorized(
                    "Missing or invalid storage event secret".into(),
                )))
            }
        }
    }
}
