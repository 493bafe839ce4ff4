//! HTTP routes for the catalog service.
//!
//! Defines the Axum router and application state.

use crate::auth::{Clock, TokenIssuer, TokenValidator};
use crate::config::Config;
use crate::directory::{InMemoryDirectory, PrincipalDirectory};
use crate::handlers;
use crate::middleware::{
    authenticate_request, enforce_route_policy, http_metrics_middleware, AuthenticationGate,
    RoutePolicy,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Request timeout applied to every route.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Mints tokens at login.
    pub issuer: Arc<TokenIssuer>,

    /// Shared with the authentication gate.
    pub validator: Arc<TokenValidator>,

    /// Principal lookup and credential checks.
    pub directory: Arc<dyn PrincipalDirectory>,
}

impl AppState {
    /// Wire issuer, validator and the in-memory directory from `config`.
    ///
    /// The bootstrap user, if configured, is the only seeded principal.
    pub fn from_config(config: Config, clock: Arc<dyn Clock>) -> Self {
        let mut directory = InMemoryDirectory::new();
        if let Some(user) = &config.bootstrap_user {
            directory.insert_user(
                user.username.clone(),
                user.password_hash(),
                user.authorities.clone(),
            );
        }

        Self::with_directory(config, clock, Arc::new(directory))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied directory.
    pub fn with_directory(
        config: Config,
        clock: Arc<dyn Clock>,
        directory: Arc<dyn PrincipalDirectory>,
    ) -> Self {
        let issuer = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_seconds, clock.clone());
        let validator = TokenValidator::new(&config.jwt_secret, clock);

        Self {
            config,
            issuer: Arc::new(issuer),
            validator: Arc::new(validator),
            directory,
        }
    }
}

/// Build the application routes.
///
/// - `/health` - liveness (public)
/// - `/metrics` - Prometheus scrape (public)
/// - `/api/auth/login` - token issuance (public via configured prefix)
/// - `/api/me` - current principal (protected)
///
/// Layer order, outermost first: HTTP metrics, timeout, trace, CORS,
/// authentication gate, route policy.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let gate = Arc::new(AuthenticationGate::new(
        state.validator.clone(),
        state.directory.clone(),
    ));
    let policy = Arc::new(RoutePolicy::new(&state.config.public_route_prefixes));

    let app_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/me", get(handlers::get_me))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Router::layer wraps in order, so the last layer added runs first
    app_routes
        .merge(metrics_routes)
        .layer(middleware::from_fn_with_state(policy, enforce_route_policy))
        .layer(middleware::from_fn_with_state(gate, authenticate_request))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(http_metrics_middleware))
}
