//! Authentication gate.
//!
//! Turns an `Authorization: Bearer <token>` header into an
//! [`AuthenticationContext`] in the request extensions. The gate never
//! rejects a request: every failure leaves the context unauthenticated and
//! control passes on to the route policy.
//!
//! Per request:
//!
//! ```text
//! START -> TOKEN_EXTRACTED -> PRINCIPAL_RESOLVED -> VALIDATED -> AUTHENTICATED
//!   |             |                  |                  |
//!   +-------------+------------------+------------------+-----> UNAUTHENTICATED
//! ```

use crate::auth::{Authentication, AuthenticationContext, TokenError, TokenValidator};
use crate::directory::PrincipalDirectory;
use crate::errors::CatalogError;
use crate::observability::{hash_for_correlation, metrics};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Authorization scheme marker, including the separating space.
const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate left a request unauthenticated despite credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("no principal for token subject")]
    PrincipalNotFound,

    #[error("principal directory unavailable")]
    DirectoryUnavailable,
}

impl GateRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            GateRejection::Token(e) => e.reason(),
            GateRejection::PrincipalNotFound => "principal_not_found",
            GateRejection::DirectoryUnavailable => "directory_unavailable",
        }
    }
}

/// Terminal state of one gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// A new authentication was installed.
    Authenticated,
    /// Header absent or not a bearer credential.
    NoCredentials,
    /// The context was already set and was left untouched.
    AlreadyAuthenticated,
    /// Credentials were presented but did not authenticate.
    Rejected(GateRejection),
}

impl GateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            GateOutcome::Authenticated => "authenticated",
            GateOutcome::NoCredentials => "no_credentials",
            GateOutcome::AlreadyAuthenticated => "already_authenticated",
            GateOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Per-request interceptor joining the validator and the directory.
pub struct AuthenticationGate {
    validator: Arc<TokenValidator>,
    directory: Arc<dyn PrincipalDirectory>,
}

impl AuthenticationGate {
    pub fn new(validator: Arc<TokenValidator>, directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self {
            validator,
            directory,
        }
    }

    /// Run the gate against one request's `Authorization` header value.
    ///
    /// `ctx` is only ever written when it is unset and the token validates
    /// for the resolved principal.
    #[instrument(skip_all, name = "catalog.middleware.auth.authenticate")]
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        ctx: &mut AuthenticationContext,
    ) -> GateOutcome {
        let outcome = self.run(authorization, ctx).await;

        metrics::record_authentication(outcome.label());
        if let GateOutcome::Rejected(rejection) = &outcome {
            metrics::record_authentication_rejection(rejection.reason());
            tracing::debug!(
                target: "catalog.middleware.auth",
                reason = rejection.reason(),
                "Request left unauthenticated"
            );
        }

        outcome
    }

    async fn run(&self, authorization: Option<&str>, ctx: &mut AuthenticationContext) -> GateOutcome {
        // START -> TOKEN_EXTRACTED
        let Some(token) = authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) else {
            return GateOutcome::NoCredentials;
        };

        // TOKEN_EXTRACTED -> PRINCIPAL_RESOLVED
        let subject = match self.validator.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => return GateOutcome::Rejected(e.into()),
        };

        if ctx.is_authenticated() {
            return GateOutcome::AlreadyAuthenticated;
        }

        let principal = match self.directory.lookup(&subject).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return GateOutcome::Rejected(GateRejection::PrincipalNotFound),
            Err(e) => {
                tracing::warn!(
                    target: "catalog.middleware.auth",
                    error = %e,
                    "Principal lookup failed"
                );
                return GateOutcome::Rejected(GateRejection::DirectoryUnavailable);
            }
        };

        // PRINCIPAL_RESOLVED -> VALIDATED
        let claims = match self.validator.check(token, principal.username()) {
            Ok(claims) => claims,
            Err(e) => return GateOutcome::Rejected(e.into()),
        };

        // VALIDATED -> AUTHENTICATED
        let user = hash_for_correlation(principal.username());
        match ctx.install(Authentication { principal, claims }) {
            Ok(()) => {
                tracing::debug!(target: "catalog.middleware.auth", user = %user, "Request authenticated");
                GateOutcome::Authenticated
            }
            Err(_) => GateOutcome::AlreadyAuthenticated,
        }
    }
}

/// Axum middleware wrapping [`AuthenticationGate::authenticate`].
///
/// Always continues to the next layer. The resulting
/// [`AuthenticationContext`] is stored in the request extensions.
pub async fn authenticate_request(
    State(gate): State<Arc<AuthenticationGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut ctx = req
        .extensions_mut()
        .remove::<AuthenticationContext>()
        .unwrap_or_default();

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    gate.authenticate(authorization, &mut ctx).await;

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Extractor for handlers that need the authenticated principal.
///
/// Rejects with 401 if the request is not authenticated.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Authentication);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticationContext>()
            .and_then(AuthenticationContext::authentication)
            .cloned()
            .map(Authenticated)
            .ok_or(CatalogError::Unauthenticated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::{ManualClock, TokenIssuer};
    use crate::directory::{DirectoryError, InMemoryDirectory, Principal};
    use async_trait::async_trait;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use common::jwt::TokenClaims;
    use common::secret::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const SECRET: &str = "gate-test-secret-at-least-32-bytes-long";
    const FOREIGN_SECRET: &str = "some-other-service-secret-32-bytes-xx";
    const TTL: i64 = 3600;

    struct CountingDirectory {
        inner: InMemoryDirectory,
        lookups: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PrincipalDirectory for CountingDirectory {
        async fn lookup(&self, subject: &str) -> Result<Option<Principal>, DirectoryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DirectoryError::Unavailable("down".to_string()));
            }
            self.inner.lookup(subject).await
        }

        async fn verify_credentials(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<Principal>, DirectoryError> {
            self.inner.verify_credentials(username, password).await
        }
    }

    struct Fixture {
        gate: AuthenticationGate,
        issuer: TokenIssuer,
        clock: Arc<ManualClock>,
        directory: Arc<CountingDirectory>,
    }

    fn fixture_with(fail: bool) -> Fixture {
        let secret = SecretString::from(SECRET.to_string());
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let directory = Arc::new(CountingDirectory {
            inner: InMemoryDirectory::new()
                .with_user("alice", "$2b$04$unused", vec!["ROLE_USER".to_string()])
                .with_user("bob", "$2b$04$unused", vec!["ROLE_USER".to_string()]),
            lookups: AtomicUsize::new(0),
            fail,
        });
        let validator = Arc::new(TokenValidator::new(&secret, clock.clone()));
        Fixture {
            gate: AuthenticationGate::new(validator, directory.clone()),
            issuer: TokenIssuer::new(&secret, TTL, clock.clone()),
            clock,
            directory,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(false)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    fn preauthenticated(username: &str) -> AuthenticationContext {
        let mut ctx = AuthenticationContext::unauthenticated();
        ctx.install(Authentication {
            principal: Principal::new(username, Vec::new()),
            claims: TokenClaims::new(username.to_string(), 0, 60),
        })
        .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let f = fixture();
        let token = f.issuer.issue("alice").unwrap().token;
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(outcome, GateOutcome::Authenticated);
        assert_eq!(ctx.principal().unwrap().username(), "alice");
        assert_eq!(ctx.principal().unwrap().authorities(), ["ROLE_USER".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_header_is_no_credentials() {
        let f = fixture();
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(None, &mut ctx).await;

        assert_eq!(outcome, GateOutcome::NoCredentials);
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_wrong_scheme_skips_validation() {
        let f = fixture();
        let mut ctx = AuthenticationContext::unauthenticated();

        for header in ["Basic xyz", "bearer abc", "Bearer", "Token abc"] {
            let outcome = f.gate.authenticate(Some(header), &mut ctx).await;
            assert_eq!(outcome, GateOutcome::NoCredentials, "{header:?}");
        }
        assert!(!ctx.is_authenticated());
        assert_eq!(f.directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forged_token_rejected_before_lookup() {
        let f = fixture();
        let foreign = TokenIssuer::new(
            &SecretString::from(FOREIGN_SECRET.to_string()),
            TTL,
            f.clock.clone(),
        );
        let token = foreign.issue("alice").unwrap().token;
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(
            outcome,
            GateOutcome::Rejected(GateRejection::Token(TokenError::SignatureMismatch))
        );
        assert!(!ctx.is_authenticated());
        assert_eq!(f.directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let f = fixture();
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some("Bearer not.a.jwt"), &mut ctx).await;

        assert_eq!(
            outcome,
            GateOutcome::Rejected(GateRejection::Token(TokenError::Malformed))
        );
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let f = fixture();
        let token = f.issuer.issue("alice").unwrap().token;
        f.clock.advance(TTL + 1);
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(
            outcome,
            GateOutcome::Rejected(GateRejection::Token(TokenError::Expired))
        );
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_unknown_principal_rejected() {
        let f = fixture();
        let token = f.issuer.issue("carol").unwrap().token;
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(outcome, GateOutcome::Rejected(GateRejection::PrincipalNotFound));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_directory_failure_treated_as_rejection() {
        let f = fixture_with(true);
        let token = f.issuer.issue("alice").unwrap().token;
        let mut ctx = AuthenticationContext::unauthenticated();

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(
            outcome,
            GateOutcome::Rejected(GateRejection::DirectoryUnavailable)
        );
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_existing_context_not_overwritten_by_valid_token() {
        let f = fixture();
        let token = f.issuer.issue("bob").unwrap().token;
        let mut ctx = preauthenticated("alice");

        let outcome = f.gate.authenticate(Some(&bearer(&token)), &mut ctx).await;

        assert_eq!(outcome, GateOutcome::AlreadyAuthenticated);
        assert_eq!(ctx.principal().unwrap().username(), "alice");
        assert_eq!(f.directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_existing_context_not_cleared_by_invalid_token() {
        let f = fixture();
        let mut ctx = preauthenticated("alice");

        f.gate.authenticate(Some("Bearer garbage"), &mut ctx).await;
        f.gate.authenticate(Some("Basic xyz"), &mut ctx).await;
        f.gate.authenticate(None, &mut ctx).await;

        assert_eq!(ctx.principal().unwrap().username(), "alice");
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(
            GateRejection::Token(TokenError::Expired).reason(),
            "expired"
        );
        assert_eq!(
            GateRejection::PrincipalNotFound.reason(),
            "principal_not_found"
        );
        assert_eq!(
            GateRejection::DirectoryUnavailable.reason(),
            "directory_unavailable"
        );
    }

    // Router-level: the middleware feeds the extractor.

    async fn whoami(Authenticated(auth): Authenticated) -> String {
        auth.principal.username().to_string()
    }

    fn app(f: Fixture) -> (Router, TokenIssuer) {
        let router = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(
                Arc::new(f.gate),
                authenticate_request,
            ));
        (router, f.issuer)
    }

    #[tokio::test]
    async fn test_middleware_passes_context_to_handler() {
        let (router, issuer) = app(fixture());
        let token = issuer.issue("alice").unwrap().token;

        let request = axum::http::Request::builder()
            .uri("/whoami")
            .header(AUTHORIZATION, bearer(&token))
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_never_rejects_itself() {
        let (router, _) = app(fixture());

        let request = axum::http::Request::builder()
            .uri("/whoami")
            .header(AUTHORIZATION, "Bearer invalid")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        // The extractor, not the gate, produces the 401
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));
    }
}
