//! Catalog Service Library
//!
//! Stateless bearer-token authentication for the product catalog API:
//!
//! - Token issuance at login (HS256 JWT with `sub`, `iat`, `exp`)
//! - Token validation on every request, without server-side sessions
//! - A per-request authentication gate feeding a route authorization policy
//!
//! # Request pipeline
//!
//! ```text
//! http_metrics -> timeout -> trace -> cors -> auth gate -> route policy -> handler
//! ```
//!
//! # Modules
//!
//! - `auth` - issuer, validator, request-scoped authentication context
//! - `config` - service configuration from environment
//! - `directory` - principal lookup collaborator
//! - `errors` - error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - authentication gate, route policy, HTTP metrics
//! - `observability` - metrics and log-safe correlation hashing
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
