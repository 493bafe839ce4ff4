//! Session token issuance.
//!
//! Tokens are compact HS256 JWTs carrying `sub`, `iat` and `exp`. The
//! issuer holds no state beyond the signing key, the configured TTL and a
//! clock; it never consults a store.

use crate::auth::clock::Clock;
use crate::auth::error::TokenError;
use crate::observability::{hash_for_correlation, metrics};
use common::jwt::TokenClaims;
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tracing::instrument;

/// A freshly minted token and its lifetime.
#[derive(Clone)]
pub struct IssuedToken {
    /// Compact `header.payload.signature` string.
    pub token: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub expires_at: i64,

    /// Seconds until expiry at the moment of issuance.
    pub expires_in: i64,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Signs session tokens for principals.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Build an issuer from the shared secret.
    ///
    /// The secret bytes are used directly as the HMAC key, identically to
    /// [`TokenValidator`](crate::auth::validator::TokenValidator).
    pub fn new(secret: &SecretString, ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            ttl_seconds,
            clock,
        }
    }

    /// Configured token lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a signed token for `subject`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::EmptySubject`] if `subject` is empty
    /// - [`TokenError::Signing`] if the JWT library fails to sign
    #[instrument(skip_all, name = "catalog.auth.issue")]
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        if subject.is_empty() {
            metrics::record_token_issuance("error");
            return Err(TokenError::EmptySubject);
        }

        let claims = TokenClaims::new(subject.to_string(), self.clock.now_unix(), self.ttl_seconds);
        let header = Header::new(Algorithm::HS256);

        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(target: "catalog.auth.issuer", error = %e, "Token signing failed");
            metrics::record_token_issuance("error");
            TokenError::Signing(e.to_string())
        })?;

        metrics::record_token_issuance("success");
        tracing::debug!(
            target: "catalog.auth.issuer",
            subject = %hash_for_correlation(subject),
            exp = claims.exp,
            "Token issued"
        );

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
            expires_in: claims.exp.saturating_sub(claims.iat),
        })
    }
}
