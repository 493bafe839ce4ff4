//! Token failure kinds.
//!
//! Callers outside the auth module only ever see a yes/no outcome. The
//! distinct kinds exist so logs and metrics can say why a token was refused.

use common::jwt::JwtFormatError;
use thiserror::Error;

/// Reasons a token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token exceeds maximum size")]
    TooLarge,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token subject does not match the expected principal")]
    SubjectMismatch,

    #[error("cannot issue a token for an empty subject")]
    EmptySubject,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Bounded label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::TooLarge => "too_large",
            TokenError::Malformed => "malformed",
            TokenError::SignatureMismatch => "signature_mismatch",
            TokenError::Expired => "expired",
            TokenError::SubjectMismatch => "subject_mismatch",
            TokenError::EmptySubject => "empty_subject",
            TokenError::Signing(_) => "signing_failed",
        }
    }
}

impl From<JwtFormatError> for TokenError {
    fn from(err: JwtFormatError) -> Self {
        match err {
            JwtFormatError::TooLarge => TokenError::TooLarge,
            JwtFormatError::Malformed => TokenError::Malformed,
        }
    }
}
