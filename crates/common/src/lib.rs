//! Common types shared across catalog components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for session-token primitives (claims, size limits, format checks)
pub mod jwt;
