//! Catalog service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Client
//! messages are generic; details are logged server-side.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Challenge sent with every 401.
const WWW_AUTHENTICATE_BEARER: &str = "Bearer realm=\"catalog-api\"";

/// Catalog service error type.
///
/// - InvalidCredentials, Unauthenticated: 401 Unauthorized
/// - BadRequest: 400 Bad Request
/// - ServiceUnavailable: 503 Service Unavailable
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::InvalidCredentials | CatalogError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CatalogError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            CatalogError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            CatalogError::Unauthenticated => (
                "UNAUTHENTICATED",
                "Authentication is required to access this resource".to_string(),
            ),
            CatalogError::BadRequest(reason) => ("BAD_REQUEST", reason.clone()),
            CatalogError::ServiceUnavailable(reason) => {
                tracing::warn!(target: "catalog.availability", reason = %reason, "Service unavailable");
                (
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            CatalogError::Internal(reason) => {
                tracing::error!(target: "catalog.internal", reason = %reason, "Internal error");
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let body = ErrorResponse {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_BEARER),
            );
        }

        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CatalogError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
        assert_eq!(
            CatalogError::BadRequest("username is required".to_string()).to_string(),
            "Bad request: username is required"
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_response() {
        let response = CatalogError::InvalidCredentials.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_unauthenticated_response_has_bearer_challenge() {
        let response = CatalogError::Unauthenticated.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(challenge.starts_with("Bearer"));

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_bad_request_keeps_reason() {
        let response = CatalogError::BadRequest("password is required".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "password is required");
    }

    #[tokio::test]
    async fn test_service_unavailable_hides_reason() {
        let response =
            CatalogError::ServiceUnavailable("directory timed out".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("directory"));
    }

    #[tokio::test]
    async fn test_internal_hides_reason() {
        let response = CatalogError::Internal("signing failed: key".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }
}
