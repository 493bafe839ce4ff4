//! Route authorization policy.
//!
//! Allow-list of public path prefixes, default-deny for everything else.
//! Runs after the authentication gate and only looks at whether the
//! request's [`AuthenticationContext`] is authenticated.

use crate::auth::AuthenticationContext;
use crate::errors::CatalogError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Operational endpoints that are public regardless of configuration.
pub const ALWAYS_PUBLIC: [&str; 2] = ["/health", "/metrics"];

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public_prefixes: Vec<String>,
}

impl RoutePolicy {
    /// Build a policy from configured public prefixes.
    pub fn new(public_prefixes: &[String]) -> Self {
        let mut prefixes: Vec<String> = ALWAYS_PUBLIC.iter().map(|p| (*p).to_string()).collect();
        for prefix in public_prefixes {
            if !prefixes.contains(prefix) {
                prefixes.push(prefix.clone());
            }
        }
        Self {
            public_prefixes: prefixes,
        }
    }

    /// True if `path` equals a public prefix or lies beneath one.
    ///
    /// Matching respects segment boundaries: `/api/auth` covers
    /// `/api/auth/login` but not `/api/authz`.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|prefix| {
            if prefix == "/" {
                return true;
            }
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn permits(&self, path: &str, ctx: &AuthenticationContext) -> bool {
        self.is_public(path) || ctx.is_authenticated()
    }
}

/// Axum middleware enforcing [`RoutePolicy`].
///
/// # Errors
///
/// [`CatalogError::Unauthenticated`] for protected routes without an
/// authenticated context.
pub async fn enforce_route_policy(
    State(policy): State<Arc<RoutePolicy>>,
    req: Request,
    next: Next,
) -> Result<Response, CatalogError> {
    let authenticated = req
        .extensions()
        .get::<AuthenticationContext>()
        .is_some_and(AuthenticationContext::is_authenticated);

    let path = req.uri().path();
    if policy.is_public(path) || authenticated {
        return Ok(next.run(req).await);
    }

    tracing::debug!(
        target: "catalog.middleware.route_policy",
        path = %path,
        "Protected route requested without authentication"
    );
    Err(CatalogError::Unauthenticated)
}
