//! Domain logic for the gallery media subsystem.
//!
//! Everything in this crate is free of I/O. Storage backends plug in through
//! the traits in [`store`] and [`storage`].

pub mod cursor;
pub mod error;
pub mod gallery_token;
pub mod media;
pub mod metadata;
pub mod pagination;
pub mod storage;
pub mod store;
pub mod types;
