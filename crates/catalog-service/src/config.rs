//! Catalog service configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! is immutable afterwards. The signing secret and bootstrap password hash
//! are redacted in Debug output.

use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default token lifetime (1 hour).
pub const DEFAULT_JWT_TTL_SECONDS: i64 = 3600;

/// Longest accepted token lifetime (24 hours).
pub const MAX_JWT_TTL_SECONDS: i64 = 86_400;

/// Minimum signing secret length. HS256 keys shorter than the hash output
/// are rejected.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Route prefixes that never require authentication.
pub const DEFAULT_PUBLIC_ROUTE_PREFIXES: &str = "/api/auth,/api/distance";

/// Authorities granted to the bootstrap user when none are configured.
pub const DEFAULT_BOOTSTRAP_AUTHORITIES: &str = "ROLE_USER";

/// A user seeded into the in-memory directory at startup.
#[derive(Clone)]
pub struct BootstrapUser {
    pub username: String,
    pub password_hash: SecretString,
    pub authorities: Vec<String>,
}

impl fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .finish()
    }
}

/// Catalog service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Shared HMAC secret for issuing and validating tokens.
    pub jwt_secret: SecretString,

    /// Token time-to-live in seconds.
    pub jwt_ttl_seconds: i64,

    /// Path prefixes exempt from authentication.
    pub public_route_prefixes: Vec<String>,

    /// Optional seed user.
    pub bootstrap_user: Option<BootstrapUser>,

    /// Seconds to wait after a shutdown signal before stopping the server.
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
            .field("public_route_prefixes", &self.public_route_prefixes)
            .field("bootstrap_user", &self.bootstrap_user)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT TTL configuration: {0}")]
    InvalidJwtTtl(String),

    #[error("Invalid public route configuration: {0}")]
    InvalidPublicRoutes(String),

    #[error("Invalid bootstrap user configuration: {0}")]
    InvalidBootstrapUser(String),

    #[error("Invalid drain configuration: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }
        let jwt_secret = SecretString::from(jwt_secret.clone());

        let jwt_ttl_seconds = if let Some(value_str) = vars.get("JWT_TTL_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtTtl(format!(
                    "JWT_TTL_SECONDS must be a valid integer, got '{value_str}': {e}"
                ))
            })?;

            if !(1..=MAX_JWT_TTL_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidJwtTtl(format!(
                    "JWT_TTL_SECONDS must be between 1 and {MAX_JWT_TTL_SECONDS}, got {value}"
                )));
            }

            value
        } else {
            DEFAULT_JWT_TTL_SECONDS
        };

        let public_route_prefixes = parse_public_prefixes(
            vars.get("PUBLIC_ROUTE_PREFIXES")
                .map_or(DEFAULT_PUBLIC_ROUTE_PREFIXES, String::as_str),
        )?;

        let bootstrap_user = parse_bootstrap_user(vars)?;

        let drain_seconds = if let Some(value_str) = vars.get("DRAIN_SECONDS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidDrain(format!(
                    "DRAIN_SECONDS must be a valid non-negative integer, got '{value_str}': {e}"
                ))
            })?
        } else {
            0
        };

        Ok(Config {
            bind_address,
            jwt_secret,
            jwt_ttl_seconds,
            public_route_prefixes,
            bootstrap_user,
            drain_seconds,
        })
    }
}

fn parse_public_prefixes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut prefixes = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !entry.starts_with('/') {
            return Err(ConfigError::InvalidPublicRoutes(format!(
                "prefix must start with '/', got '{entry}'"
            )));
        }
        // "/api/auth/" and "/api/auth" describe the same subtree
        let normalized = if entry.len() > 1 {
            entry.trim_end_matches('/')
        } else {
            entry
        };
        prefixes.push(normalized.to_string());
    }
    Ok(prefixes)
}

fn parse_bootstrap_user(vars: &HashMap<String, String>) -> Result<Option<BootstrapUser>, ConfigError> {
    let username = vars.get("BOOTSTRAP_USERNAME").filter(|s| !s.is_empty());
    let password_hash = vars.get("BOOTSTRAP_PASSWORD_HASH").filter(|s| !s.is_empty());

    match (username, password_hash) {
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => Err(ConfigError::InvalidBootstrapUser(
            "BOOTSTRAP_USERNAME and BOOTSTRAP_PASSWORD_HASH must be set together".to_string(),
        )),
        (Some(username), Some(hash)) => {
            if !hash.starts_with("$2") {
                return Err(ConfigError::InvalidBootstrapUser(
                    "BOOTSTRAP_PASSWORD_HASH must be a bcrypt hash".to_string(),
                ));
            }
            let authorities = vars
                .get("BOOTSTRAP_AUTHORITIES")
                .map_or(DEFAULT_BOOTSTRAP_AUTHORITIES, String::as_str)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            Ok(Some(BootstrapUser {
                username: username.clone(),
                password_hash: SecretString::from(hash.clone()),
                authorities,
            }))
        }
    }
}

impl BootstrapUser {
    /// The stored bcrypt hash.
    pub fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([("JWT_SECRET".to_string(), SECRET.to_string())])
    }

    fn with(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars = base_vars();
        for (k, v) in extra {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        vars
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.jwt_ttl_seconds, DEFAULT_JWT_TTL_SECONDS);
        assert_eq!(config.public_route_prefixes, vec!["/api/auth", "/api/distance"]);
        assert!(config.bootstrap_user.is_none());
        assert_eq!(config.drain_seconds, 0);
        assert_eq!(config.jwt_secret.expose_secret(), SECRET);
    }

    #[test]
    fn test_missing_secret() {
        let result = Config::from_vars(&HashMap::new());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let vars = HashMap::from([("JWT_SECRET".to_string(), "too-short".to_string())]);
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidJwtSecret(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_vars(&with(&[
            ("BOOTSTRAP_USERNAME", "admin"),
            ("BOOTSTRAP_PASSWORD_HASH", "$2b$12$abcdefghijklmnopqrstuv"),
        ]))
        .unwrap();
        let debug_str = format!("{config:?}");

        assert!(!debug_str.contains(SECRET));
        assert!(!debug_str.contains("$2b$12$"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_custom_ttl() {
        let config = Config::from_vars(&with(&[("JWT_TTL_SECONDS", "900")])).unwrap();
        assert_eq!(config.jwt_ttl_seconds, 900);

        let config = Config::from_vars(&with(&[("JWT_TTL_SECONDS", "86400")])).unwrap();
        assert_eq!(config.jwt_ttl_seconds, MAX_JWT_TTL_SECONDS);
    }

    #[test]
    fn test_invalid_ttl() {
        for value in ["0", "-5", "86401", "abc", ""] {
            let result = Config::from_vars(&with(&[("JWT_TTL_SECONDS", value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidJwtTtl(_))),
                "{value:?} accepted"
            );
        }
    }

    #[test]
    fn test_public_prefixes_parsed_and_normalized() {
        let config = Config::from_vars(&with(&[(
            "PUBLIC_ROUTE_PREFIXES",
            " /api/auth/ , /docs,, /",
        )]))
        .unwrap();
        assert_eq!(config.public_route_prefixes, vec!["/api/auth", "/docs", "/"]);
    }

    #[test]
    fn test_public_prefixes_must_be_absolute() {
        let result = Config::from_vars(&with(&[("PUBLIC_ROUTE_PREFIXES", "/api/auth,docs")]));
        assert!(matches!(result, Err(ConfigError::InvalidPublicRoutes(_))));
    }

    #[test]
    fn test_empty_public_prefixes_allowed() {
        let config = Config::from_vars(&with(&[("PUBLIC_ROUTE_PREFIXES", "")])).unwrap();
        assert!(config.public_route_prefixes.is_empty());
    }

    #[test]
    fn test_bootstrap_user() {
        let config = Config::from_vars(&with(&[
            ("BOOTSTRAP_USERNAME", "admin"),
            ("BOOTSTRAP_PASSWORD_HASH", "$2b$12$abcdefghijklmnopqrstuv"),
            ("BOOTSTRAP_AUTHORITIES", "ROLE_USER, ROLE_ADMIN"),
        ]))
        .unwrap();
        let user = config.bootstrap_user.unwrap();

        assert_eq!(user.username, "admin");
        assert_eq!(user.password_hash(), "$2b$12$abcdefghijklmnopqrstuv");
        assert_eq!(user.authorities, vec!["ROLE_USER", "ROLE_ADMIN"]);
    }

    #[test]
    fn test_bootstrap_user_default_authorities() {
        let config = Config::from_vars(&with(&[
            ("BOOTSTRAP_USERNAME", "admin"),
            ("BOOTSTRAP_PASSWORD_HASH", "$2b$12$abcdefghijklmnopqrstuv"),
        ]))
        .unwrap();
        assert_eq!(config.bootstrap_user.unwrap().authorities, vec!["ROLE_USER"]);
    }

    #[test]
    fn test_bootstrap_user_requires_both_fields() {
        let only_name = with(&[("BOOTSTRAP_USERNAME", "admin")]);
        let only_hash = with(&[("BOOTSTRAP_PASSWORD_HASH", "$2b$12$abc")]);

        assert!(matches!(
            Config::from_vars(&only_name),
            Err(ConfigError::InvalidBootstrapUser(_))
        ));
        assert!(matches!(
            Config::from_vars(&only_hash),
            Err(ConfigError::InvalidBootstrapUser(_))
        ));
    }

    #[test]
    fn test_bootstrap_user_rejects_plaintext_password() {
        let result = Config::from_vars(&with(&[
            ("BOOTSTRAP_USERNAME", "admin"),
            ("BOOTSTRAP_PASSWORD_HASH", "hunter2"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidBootstrapUser(_))));
    }

    #[test]
    fn test_drain_seconds() {
        let config = Config::from_vars(&with(&[("DRAIN_SECONDS", "15")])).unwrap();
        assert_eq!(config.drain_seconds, 15);

        let result = Config::from_vars(&with(&[("DRAIN_SECONDS", "-1")]));
        assert!(matches!(result, Err(ConfigError::InvalidDrain(_))));
    }
}
