//! Test server harness for E2E testing
//!
//! Provides `TestCatalogServer` for spawning real catalog server instances in
//! tests. The server runs on a random local port with a manually driven
//! clock, so expiry can be exercised without sleeping.

use crate::token_fixtures::{TEST_PASSWORD, TEST_SECRET, TEST_USERNAME};
use catalog_service::auth::{Clock, IssuedToken, ManualClock};
use catalog_service::config::Config;
use catalog_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// bcrypt's minimum cost, for fast test logins.
const TEST_BCRYPT_COST: u32 = 4;

/// Test harness for spawning the catalog service in E2E tests.
///
/// The directory is seeded with [`TEST_USERNAME`] / [`TEST_PASSWORD`].
pub struct TestCatalogServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    clock: Arc<ManualClock>,
    _handle: JoinHandle<()>,
}

impl TestCatalogServer {
    /// Spawn a server with default test configuration.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(&[]).await
    }

    /// Spawn a server, overriding or adding environment-style variables.
    ///
    /// `JWT_SECRET` defaults to [`TEST_SECRET`] and the bootstrap user to
    /// the test credentials.
    pub async fn spawn_with_vars(overrides: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let password_hash = bcrypt::hash(TEST_PASSWORD, TEST_BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash test password: {}", e))?;

        let mut vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWT_SECRET".to_string(), TEST_SECRET.to_string()),
            ("BOOTSTRAP_USERNAME".to_string(), TEST_USERNAME.to_string()),
            ("BOOTSTRAP_PASSWORD_HASH".to_string(), password_hash),
        ]);
        for (key, value) in overrides {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let clock = Arc::new(ManualClock::starting_now());
        let state = Arc::new(AppState::from_config(config, clock.clone()));

        // Not installed globally, so parallel test servers don't collide
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            clock,
            _handle: handle,
        })
    }

    /// Base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Clock shared by the server's issuer and validator.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Current server time (Unix seconds).
    pub fn clock_now(&self) -> i64 {
        self.clock.now_unix()
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Issue a token through the server's own issuer.
    pub fn issue_token(&self, subject: &str) -> Result<String, anyhow::Error> {
        self.issue(subject).map(|issued| issued.token)
    }

    pub fn issue(&self, subject: &str) -> Result<IssuedToken, anyhow::Error> {
        self.state
            .issuer
            .issue(subject)
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))
    }

    /// Server-side validation, for asserting on tokens obtained over HTTP.
    pub fn validate(&self, token: &str, subject: &str) -> bool {
        self.state.validator.validate(token, subject)
    }
}

impl Drop for TestCatalogServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
