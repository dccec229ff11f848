//! Route definitions for the `/gallery` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::gallery;
use crate::state::AppState;

/// Routes mounted at `/gallery`.
///
/// ```text
/// POST   /{year}/auth                 -> authenticate
/// GET    /{year}/media                -> list_media
/// POST   /{year}/media/upload         -> request_upload
/// GET    /{year}/media/{media_id}     -> get_media
/// PATCH  /{year}/media/{media_id}     -> update_media
/// DELETE /{year}/media/{media_id}     -> delete_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{year}/auth", post(gallery::authenticate))
        .route("/{year}/media", get(gallery::list_media))
        .route("/{year}/media/upload", post(gallery::request_upload))
        .route(
            "/{year}/media/{media_id}",
            get(gallery::get_media)
                .patch(gallery::update_media)
                .delete(gallery::delete_media),
        )
}
