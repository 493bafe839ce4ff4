//! Request-scoped authentication state.
//!
//! An [`AuthenticationContext`] lives in the request's extensions for the
//! duration of one request. It starts unauthenticated and can be set at
//! most once; later attempts leave the existing decision untouched.

use crate::directory::Principal;
use common::jwt::TokenClaims;
use thiserror::Error;

/// An authenticated principal together with the token claims that proved it.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub principal: Principal,
    pub claims: TokenClaims,
}

/// Returned when something tries to authenticate an already authenticated
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request is already authenticated")]
pub struct AlreadyAuthenticated;

/// Either "unauthenticated" or "authenticated as P".
#[derive(Debug, Clone, Default)]
pub struct AuthenticationContext {
    authentication: Option<Authentication>,
}

impl AuthenticationContext {
    /// A fresh, unauthenticated context.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Install `authentication` if the context is still unset.
    ///
    /// # Errors
    ///
    /// [`AlreadyAuthenticated`] if a previous call already succeeded. The
    /// stored authentication is not modified in that case.
    pub fn install(&mut self, authentication: Authentication) -> Result<(), AlreadyAuthenticated> {
        if self.authentication.is_some() {
            return Err(AlreadyAuthenticated);
        }
        self.authentication = Some(authentication);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.authentication.as_ref().map(|a| &a.principal)
    }
}
