//! # Keystone Core
//!
//! Authentication domain for the Keystone server: credentials and their
//! refresh-token sessions, the bearer token codec, the account lockout policy,
//! the request guard, and the auth service that ties them together.
//! Storage, rate limiting, password hashing and email delivery are reached
//! through the traits in [`repositories`] and [`services`].

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
