//! # Catalog Test Utilities
//!
//! Shared test utilities for the catalog service.
//!
//! This crate provides:
//! - Server test harness (`TestCatalogServer` for E2E tests)
//! - Deterministic token fixtures (forged, tampered, expired, unsigned)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestCatalogServer::spawn().await?;
//!     let token = server.issue_token(TEST_USERNAME)?;
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/me", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod token_fixtures;

pub use server_harness::*;
pub use token_fixtures::*;
