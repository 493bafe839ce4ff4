//! HTTP request handlers for the catalog service.

pub mod auth;
pub mod health;
pub mod me;
pub mod metrics;

pub use auth::login;
pub use health::health_check;
pub use me::get_me;
pub use metrics::metrics_handler;
