//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT generation, verification and unverified payload decoding.

pub mod jwt;
pub mod password;
