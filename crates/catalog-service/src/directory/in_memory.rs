use super::{DirectoryError, Principal, PrincipalDirectory};
use crate::observability::hash_for_correlation;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::instrument;

/// Verified against when the username is unknown, so that unknown and known
/// usernames cost the same bcrypt work.
const DUMMY_BCRYPT_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

#[derive(Clone)]
struct UserRecord {
    password_hash: String,
    authorities: Vec<String>,
}

/// Directory backed by a fixed in-process user table.
///
/// Passwords are stored as bcrypt hashes only.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a user with a precomputed bcrypt hash.
    pub fn insert_user(
        &mut self,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: Vec<String>,
    ) {
        self.users.insert(
            username.into(),
            UserRecord {
                password_hash: password_hash.into(),
                authorities,
            },
        );
    }

    /// Builder form of [`insert_user`](Self::insert_user).
    #[must_use]
    pub fn with_user(
        mut self,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: Vec<String>,
    ) -> Self {
        self.insert_user(username, password_hash, authorities);
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    #[instrument(skip_all, name = "catalog.directory.lookup")]
    async fn lookup(&self, subject: &str) -> Result<Option<Principal>, DirectoryError> {
        Ok(self
            .users
            .get(subject)
            .map(|record| Principal::new(subject, record.authorities.clone())))
    }

    #[instrument(skip_all, name = "catalog.directory.verify_credentials")]
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, DirectoryError> {
        let record = self.users.get(username);

        // Always run bcrypt, even for unknown users
        let hash_to_verify = record.map_or(DUMMY_BCRYPT_HASH, |r| r.password_hash.as_str());
        let is_valid = bcrypt::verify(password, hash_to_verify).map_err(|e| {
            tracing::error!(
                target: "catalog.directory",
                user = %hash_for_correlation(username),
                error = %e,
                "Stored password hash could not be verified"
            );
            DirectoryError::Unavailable("password hash verification failed".to_string())
        })?;

        match record {
            Some(r) if is_valid => Ok(Some(Principal::new(username, r.authorities.clone()))),
            _ => Ok(None),
        }
    }
}
