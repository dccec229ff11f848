//! Gallery services.
//!
//! - [`access`] -- the Access Guard: password validation and token checks.
//! - [`upload`] -- the Upload Coordinator: write permissions and the
//!   provisional catalog record.
//! - [`reconcile`] -- the Asset Reconciler: turns object-created
//!   notifications into canonical catalog records.
//! - [`catalog`] -- the Catalog Query Service: get, list, edit, delete.
//!
//! Each service holds `Arc`s to the collaborator traits from
//! `fieldday_core` and is built per request from [`crate::state::AppState`].

pub mod access;
pub mod catalog;
pub mod reconcile;
pub mod upload;

pub use access::{AccessGuard, PasswordOutcome};
pub use catalog::{CatalogQueryService, ListParams, MediaPage, MediaUpdate, MediaView};
pub use reconcile::{AssetReconciler, ReconcileOutcome, StorageEvent};
pub use upload::{UploadCoordinator, UploadGrant, UploadRequest};

use fieldday_core::error::CoreError;
use fieldday_core::types::Year;

/// Parse a `{year}` path segment. Only plain decimal digits are accepted.
pub fn parse_year(raw: &str) -> Result<Year, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid year '{raw}'"));
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}
