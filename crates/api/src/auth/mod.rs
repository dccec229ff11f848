//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and verification of gallery passwords.

pub mod password;
