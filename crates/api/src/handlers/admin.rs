//! Handlers for `/admin/years/{year}/gallery-protection`.
//!
//! Setting a password stores a fresh hash and a fresh token secret together;
//! clearing it removes both. Rotating the secret alone invalidates every
//! token issued for the year.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use fieldday_core::error::CoreError;
use fieldday_core::gallery_token::generate_token_secret;
use fieldday_core::store::GalleryProtection;
use fieldday_core::types::Year;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password_blocking, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::AppResult;
use crate::gallery::parse_year;
use crate::middleware::auth::AdminKey;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the protection update. `null` or an absent password
/// opens the gallery.
#[derive(Debug, Default, Deserialize)]
pub struct ProtectionRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionResponse {
    pub year: Year,
    pub protected: bool,
}

/// PUT /api/v1/admin/years/{year}/gallery-protection
pub async fn set_gallery_protection(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(year): Path<String>,
    body: Result<Json<ProtectionRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<ProtectionResponse>>> {
    let year = parse_year(&year)?;
    let Json(request) = body?;

    let protection = match request.password {
        Some(password) => {
            validate_password_strength(&password, MIN_PASSWORD_LENGTH)
                .map_err(CoreError::Validation)?;
            let hash = hash_password_blocking(password).await?;
            GalleryProtection::protected(year, hash, generate_token_secret())
        }
        None => GalleryProtection::open(year),
    };

    if !state.years.set_protection(&protection).await? {
        return Err(CoreError::not_found("OlympicsYear", year).into());
    }

    tracing::info!(year, protected = protection.is_protected(), "Updated gallery protection");
    Ok(DataResponse::json(ProtectionResponse {
        year,
        protected: protection.is_protected(),
    }))
}

/// POST /api/v1/admin/years/{year}/gallery-protection/rotate-secret
pub async fn rotate_token_secret(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> AppResult<Json<DataResponse<ProtectionResponse>>> {
    let year = parse_year(&year)?;
    let current = state
        .years
        .find_protection(year)
        .await?
        .ok_or_else(|| CoreError::not_found("OlympicsYear", year))?;

    let Some(hash) = current.password_hash else {
        return Err(CoreError::Validation(format!(
            "Gallery for {year} is not password-protected"
        ))
        .into());
    };

    let rotated = GalleryProtection::protected(year, hash, generate_token_secret());
    if !state.years.set_protection(&rotated).await? {
        return Err(CoreError::not_found("OlympicsYear", year).into());
    }

    tracing::info!(year, "Rotated gallery token secret");
    Ok(DataResponse::json(ProtectionResponse {
        year,
        protected: true,
    }))
}
