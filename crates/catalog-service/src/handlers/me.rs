//! Current principal handler.

use crate::middleware::Authenticated;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

/// Response for `GET /api/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub authorities: Vec<String>,

    /// Token issued-at (Unix seconds).
    pub iat: i64,

    /// Token expiry (Unix seconds).
    pub exp: i64,
}

/// Handler for GET /api/me
///
/// ```json
/// {"username": "alice", "authorities": ["ROLE_USER"], "iat": 1700000000, "exp": 1700003600}
/// ```
#[instrument(skip_all, name = "catalog.handlers.me")]
pub async fn get_me(Authenticated(auth): Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        username: auth.principal.username().to_string(),
        authorities: auth.principal.authorities().to_vec(),
        iat: auth.claims.iat,
        exp: auth.claims.exp,
    })
}
