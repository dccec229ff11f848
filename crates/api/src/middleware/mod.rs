//! Request guards implemented as Axum extractors.
//!
//! - [`auth::GalleryAccess`] -- Runs the Access Guard for the `{year}` in the path.
//! - [`auth::AdminKey`] -- Requires the configured admin key.
//! - [`auth::StorageEventAuth`] -- Authenticates object-store notifications.

pub mod auth;
