//! Authentication primitives.
//!
//! - [`jwt`] -- verification of session tokens issued by the auth provider.
//! - [`signature`] -- HMAC-SHA256 signatures on workflow engine webhooks.

pub mod jwt;
pub mod signature;
