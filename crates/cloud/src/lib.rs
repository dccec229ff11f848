//! Object-store implementations for gallery assets.
//!
//! - [`s3`] -- Amazon S3 (or any S3-compatible endpoint) via `aws-sdk-s3`.
//! - [`memory`] -- an in-process store with fake permission URLs.

pub mod memory;
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;
