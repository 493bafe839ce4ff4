//! JWT primitives shared by the catalog service and its test utilities.
//!
//! This module provides:
//! - The session token claim set (`sub`, `iat`, `exp`)
//! - Size limits applied before any parsing (DoS prevention)
//! - A structural pre-check for compact JWS serialization
//!
//! Nothing in here verifies signatures. Claims produced by this module are
//! only trustworthy once the caller has verified the token against the
//! signing secret.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Session tokens are ~200 bytes (HS256 signature, three claims). Anything
/// larger than this is rejected before base64 decoding or HMAC computation.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Number of dot-separated segments in a compact JWS (header.payload.signature).
pub const JWS_SEGMENT_COUNT: usize = 3;

/// Claim names every session token must carry.
pub const REQUIRED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

// =============================================================================
// Error Types
// =============================================================================

/// Structural problems detected before signature verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtFormatError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("token exceeds maximum size")]
    TooLarge,

    /// Token is not three non-empty base64url segments.
    #[error("token is not a compact JWS")]
    Malformed,
}

// =============================================================================
// Claims
// =============================================================================

/// Claims embedded in a session token.
///
/// The `sub` field identifies a principal (a username) and is redacted in
/// Debug output so claims can be logged safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (principal username) - redacted in Debug output.
    pub sub: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl TokenClaims {
    /// Build claims for `sub`, issued at `iat`, valid for `ttl_seconds`.
    #[must_use]
    pub fn new(sub: String, iat: i64, ttl_seconds: i64) -> Self {
        Self {
            sub,
            iat,
            exp: iat.saturating_add(ttl_seconds),
        }
    }

    /// True once `now` has reached the expiration timestamp.
    ///
    /// A token is fresh strictly before `exp`; at `exp` it is expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

// =============================================================================
// Structural checks
// =============================================================================

/// Reject oversized tokens.
///
/// # Errors
///
/// Returns [`JwtFormatError::TooLarge`] if `token` is longer than
/// [`MAX_JWT_SIZE_BYTES`].
pub fn check_token_size(token: &str) -> Result<(), JwtFormatError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(JwtFormatError::TooLarge);
    }
    Ok(())
}

/// Cheap structural check for compact JWS serialization.
///
/// Size-checks first, then requires exactly three non-empty segments that
/// each decode as unpadded base64url. This does NOT verify anything about
/// the contents.
///
/// # Errors
///
/// Returns [`JwtFormatError`] describing the first structural problem found.
pub fn check_compact_format(token: &str) -> Result<(), JwtFormatError> {
    check_token_size(token)?;

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != JWS_SEGMENT_COUNT {
        return Err(JwtFormatError::Malformed);
    }

    for segment in segments {
        if segment.is_empty() || URL_SAFE_NO_PAD.decode(segment).is_err() {
            return Err(JwtFormatError::Malformed);
        }
    }

    Ok(())
}
