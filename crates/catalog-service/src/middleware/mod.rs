//! HTTP middleware for the catalog service.
//!
//! - `auth` - authentication gate and the `Authenticated` extractor
//! - `route_policy` - public allow-list / default-deny decision
//! - `http_metrics` - request metrics for all responses

pub mod auth;
pub mod http_metrics;
pub mod route_policy;

pub use auth::{
    authenticate_request, Authenticated, AuthenticationGate, GateOutcome, GateRejection,
};
pub use http_metrics::http_metrics_middleware;
pub use route_policy::{enforce_route_policy, RoutePolicy};
