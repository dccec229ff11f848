//! Handlers for the `/gallery/{year}` resource.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use fieldday_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::gallery::{
    parse_year, ListParams, MediaPage, MediaUpdate, MediaView, PasswordOutcome, UploadGrant,
    UploadRequest,
};
use crate::middleware::auth::GalleryAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /gallery/{year}/auth`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthRequest {
    pub password: Option<String>,
}

/// Token returned by a successful password check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Unix timestamp (seconds).
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub media_id: String,
    pub deleted: bool,
}

/// POST /api/v1/gallery/{year}/auth
///
/// Exchange the gallery password for an access token. Open galleries issue
/// a token for any (or no) password.
pub async fn authenticate(
    State(state): State<AppState>,
    Path(year): Path<String>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let year = parse_year(&year)?;
    let Json(request) = body?;

    match state
        .access_guard()
        .validate_password(year, request.password.as_deref())
        .await?
    {
        PasswordOutcome::Granted(issued) => Ok(DataResponse::json(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        })),
        PasswordOutcome::Rejected => {
            Err(CoreError::Unauthorized("Invalid gallery password".into()).into())
        }
    }
}

/// GET /api/v1/gallery/{year}/media
///
/// One page of media items. Filters: `eventId`, `teamId` (comma-separated),
/// `person`; paging: `limit`, `nextToken`.
pub async fn list_media(
    access: GalleryAccess,
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<MediaPage>>> {
    let Query(params) = params?;
    let page = state.catalog_service().list(access.year, &params).await?;
    Ok(DataResponse::json(page))
}

/// GET /api/v1/gallery/{year}/media/{media_id}
pub async fn get_media(
    access: GalleryAccess,
    State(state): State<AppState>,
    Path((_, media_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<MediaView>>> {
    let view = state.catalog_service().get(access.year, &media_id).await?;
    Ok(DataResponse::json(view))
}

/// POST /api/v1/gallery/{year}/media/upload
///
/// Issue write permissions for a new item and record it as pending.
pub async fn request_upload(
    access: GalleryAccess,
    State(state): State<AppState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<UploadGrant>>> {
    let Json(request) = body?;
    let grant = state
        .upload_coordinator()
        .request_upload(access.year, request)
        .await?;
    Ok(DataResponse::json(grant))
}

/// PATCH /api/v1/gallery/{year}/media/{media_id}
pub async fn update_media(
    access: GalleryAccess,
    State(state): State<AppState>,
    Path((_, media_id)): Path<(String, String)>,
    body: Result<Json<MediaUpdate>, JsonRejection>,
) -> AppResult<Json<DataResponse<MediaView>>> {
    let Json(update) = body?;
    let view = state
        .catalog_service()
        .update(access.year, &media_id, update)
        .await?;
    Ok(DataResponse::json(view))
}

/// DELETE /api/v1/gallery/{year}/media/{media_id}
pub async fn delete_media(
    access: GalleryAccess,
    State(state): State<AppState>,
    Path((_, media_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<DeletedResponse>>> {
    state
        .catalog_service()
        .delete(access.year, &media_id)
        .await?;
    Ok(DataResponse::json(DeletedResponse {
        media_id,
        deleted: true,
    }))
}
