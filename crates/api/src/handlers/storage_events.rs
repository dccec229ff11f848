//! Handler for object-created notifications from the object store.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::gallery::StorageEvent;
use crate::middleware::auth::StorageEventAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedResponse {
    /// Number of object keys queued for reconciliation.
    pub accepted: usize,
}

/// POST /api/v1/internal/storage/object-created
///
/// Always answers 202 once authenticated. Reconciliation runs on a spawned
/// task; an unreadable body is logged and acknowledged so the store does not
/// keep redelivering it.
pub async fn object_created(
    _auth: StorageEventAuth,
    State(state): State<AppState>,
    body: Result<Json<StorageEvent>, JsonRejection>,
) -> (StatusCode, Json<DataResponse<AcceptedResponse>>) {
    let keys = match body {
        Ok(Json(event)) => event.object_keys(),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Ignoring unreadable storage notification");
            Vec::new()
        }
    };

    let accepted = keys.len();
    if accepted > 0 {
        let reconciler = state.reconciler();
        tokio::spawn(async move {
            reconciler.reconcile_keys(&keys).await;
        });
    }

    (
        StatusCode::ACCEPTED,
        DataResponse::json(AcceptedResponse { accepted }),
    )
}
