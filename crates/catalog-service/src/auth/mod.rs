//! Stateless token authentication.
//!
//! - [`issuer`]: mints signed session tokens
//! - [`validator`]: verifies signature, freshness and subject
//! - [`context`]: per-request authenticated-principal state
//! - [`clock`]: injectable time source

pub mod clock;
pub mod context;
pub mod error;
pub mod issuer;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{AlreadyAuthenticated, Authentication, AuthenticationContext};
pub use error::TokenError;
pub use issuer::{IssuedToken, TokenIssuer};
pub use validator::TokenValidator;
