//! Principal directory collaborator.
//!
//! The authentication core resolves token subjects through
//! [`PrincipalDirectory`] and never owns or persists principals itself.

mod in_memory;

pub use in_memory::InMemoryDirectory;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Resolved identity for a token subject.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
    authorities: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    /// The principal's subject, compared verbatim against token `sub`.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory backend unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of principals by subject.
///
/// Implementations may block or suspend; callers impose no retry policy.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Resolve `subject`. `Ok(None)` means no such principal.
    async fn lookup(&self, subject: &str) -> Result<Option<Principal>, DirectoryError>;

    /// Check a username/password pair, returning the principal on success.
    ///
    /// `Ok(None)` covers both unknown usernames and wrong passwords.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, DirectoryError>;
}
