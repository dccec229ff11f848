//! Shared response envelope types for API handlers.
//!
//! All successful API responses use a `{ "success": true, "data": ... }`
//! envelope. Errors are rendered by [`crate::error::AppError`].

use axum::Json;
use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(DataResponse::json(items))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    /// Wrap `data` in a successful envelope.
    pub fn json(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}
