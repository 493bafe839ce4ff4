//! Observability for the catalog service.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` and explicit field
//! allow-listing:
//! - **SAFE**: outcome enums, failure reasons, timestamps
//! - **HASHED**: principal subjects (usernames), via [`hash_for_correlation`]
//! - **NEVER**: tokens, passwords, the signing secret

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Lets log lines about the same principal be correlated without writing
/// the username itself.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}
