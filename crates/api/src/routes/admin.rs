//! Route definitions for `/admin`.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires `X-Admin-Key`.
///
/// ```text
/// PUT    /years/{year}/gallery-protection                -> set_gallery_protection
/// POST   /years/{year}/gallery-protection/rotate-secret  -> rotate_token_secret
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/years/{year}/gallery-protection",
            put(admin::set_gallery_protection),
        )
        .route(
            "/years/{year}/gallery-protection/rotate-secret",
            post(admin::rotate_token_secret),
        )
}
