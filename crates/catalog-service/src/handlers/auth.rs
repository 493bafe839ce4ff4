//! Login handler.
//!
//! Exchanges a username/password pair for a session token.

use crate::auth::TokenError;
use crate::errors::CatalogError;
use crate::observability::hash_for_correlation;
use crate::routes::AppState;
use axum::{extract::State, Json};
use common::secret::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Handler for POST /api/auth/login
///
/// - 200 with a bearer token on valid credentials
/// - 400 if username or password is blank
/// - 401 `INVALID_CREDENTIALS` otherwise
#[instrument(skip_all, name = "catalog.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, CatalogError> {
    if request.username.trim().is_empty() {
        return Err(CatalogError::BadRequest("username is required".to_string()));
    }
    if request.password.expose_secret().is_empty() {
        return Err(CatalogError::BadRequest("password is required".to_string()));
    }

    let principal = state
        .directory
        .verify_credentials(&request.username, request.password.expose_secret())
        .await
        .map_err(|e| CatalogError::ServiceUnavailable(e.to_string()))?
        .ok_or_else(|| {
            tracing::info!(
                target: "catalog.handlers.login",
                user = %hash_for_correlation(&request.username),
                "Login failed"
            );
            CatalogError::InvalidCredentials
        })?;

    let issued = state
        .issuer
        .issue(principal.username())
        .map_err(|e| match e {
            TokenError::EmptySubject => CatalogError::InvalidCredentials,
            other => CatalogError::Internal(other.to_string()),
        })?;

    tracing::info!(
        target: "catalog.handlers.login",
        user = %hash_for_correlation(principal.username()),
        "Login succeeded"
    );

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}
