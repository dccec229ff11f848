//! Route definitions for `/internal`: callbacks from infrastructure, not
//! from gallery clients.

use axum::routing::post;
use axum::Router;

use crate::handlers::storage_events;
use crate::state::AppState;

/// ```text
/// POST   /storage/object-created   -> object_created
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/storage/object-created",
        post(storage_events::object_created),
    )
}
