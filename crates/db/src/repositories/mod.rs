//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. The `Pg*` structs wrap a pool and expose
//! the repositories through the store traits of `fieldday_core::store`.

pub mod media_item_repo;
pub mod olympics_year_repo;

pub use media_item_repo::{MediaItemRepo, PgMediaCatalog};
pub use olympics_year_repo::{OlympicsYearRepo, PgYearConfigStore};

use fieldday_core::error::CoreError;

/// Map a sqlx error to an internal core error, keeping the context.
pub(crate) fn internal(context: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| CoreError::Internal(format!("{context}: {err}"))
}
