pub mod admin;
pub mod gallery;
pub mod health;
pub mod internal;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /gallery/{year}/auth                                   password -> token (public)
/// /gallery/{year}/media                                  list (token)
/// /gallery/{year}/media/upload                           request upload (token)
/// /gallery/{year}/media/{media_id}                       get, edit, delete (token)
///
/// /admin/years/{year}/gallery-protection                 set / clear password (admin key)
/// /admin/years/{year}/gallery-protection/rotate-secret   rotate token secret (admin key)
///
/// /internal/storage/object-created                       object-store notification
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/gallery", gallery::router())
        .nest("/admin", admin::router())
        .nest("/internal", internal::router())
}
