//! Session token validation.
//!
//! Every path through this module verifies the HS256 signature before any
//! claim is read. Validation then applies, in order and short-circuiting:
//!
//! 1. size and compact-format checks
//! 2. signature verification (constant-time MAC comparison in `jsonwebtoken`)
//! 3. freshness: `now < exp`
//! 4. subject match against the expected principal
//!
//! The externally visible outcome of [`TokenValidator::validate`] is a plain
//! boolean. [`TokenValidator::check`] returns the failure kind for logging
//! and metrics.

use crate::auth::clock::Clock;
use crate::auth::error::TokenError;
use crate::observability::metrics;
use chrono::{DateTime, Utc};
use common::jwt::{check_compact_format, TokenClaims};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Verifies session tokens against the shared secret.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    /// Build a validator from the shared secret.
    pub fn new(secret: &SecretString, clock: Arc<dyn Clock>) -> Self {
        // Freshness is judged against the injected clock below, so the
        // library's own wall-clock exp/nbf checks are turned off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            clock,
        }
    }

    /// Parse the token and verify its signature, returning trusted claims.
    fn verify_signature(&self, token: &str) -> Result<TokenClaims, TokenError> {
        check_compact_format(token)?;

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::SignatureMismatch
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Subject claim of a correctly signed token.
    ///
    /// Does not check expiry. Used by the gate as a directory lookup key.
    ///
    /// # Errors
    ///
    /// Any format or signature failure.
    #[instrument(skip_all, name = "catalog.auth.extract_subject")]
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.verify_signature(token)?;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(claims.sub)
    }

    /// Expiry claim of a correctly signed token.
    ///
    /// # Errors
    ///
    /// Any format or signature failure, or an `exp` outside chrono's range.
    #[instrument(skip_all, name = "catalog.auth.extract_expiry")]
    pub fn extract_expiry(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let claims = self.verify_signature(token)?;
        DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)
    }

    /// Full validation with the failure kind.
    ///
    /// # Errors
    ///
    /// The first failing check, in the order documented on this module.
    #[instrument(skip_all, name = "catalog.auth.check")]
    pub fn check(&self, token: &str, expected_subject: &str) -> Result<TokenClaims, TokenError> {
        let result = self.verify_signature(token).and_then(|claims| {
            if claims.is_expired_at(self.clock.now_unix()) {
                return Err(TokenError::Expired);
            }
            if claims.sub != expected_subject {
                return Err(TokenError::SubjectMismatch);
            }
            Ok(claims)
        });

        match &result {
            Ok(_) => metrics::record_token_validation("success", None),
            Err(e) => {
                tracing::debug!(
                    target: "catalog.auth.validator",
                    reason = e.reason(),
                    "Token rejected"
                );
                metrics::record_token_validation("error", Some(e.reason()));
            }
        }

        result
    }

    /// True iff `token` is correctly signed, unexpired and issued for
    /// `expected_subject`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.check(token, expected_subject).is_ok()
    }
}
