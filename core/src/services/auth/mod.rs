//! Authentication service module
//!
//! This module provides the authentication flow around a credential:
//! - Registration and password login
//! - Refresh token rotation and session management
//! - Account lockout after repeated failed logins
//! - The per-request guard and role authorization
//! - The rate limiter port for authentication endpoints

mod account_lock;
mod config;
mod guard;
mod latency;
mod rate_limiter;
mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use account_lock::{AccountLockPolicy, LockOutcome};
pub use config::AuthServiceConfig;
pub use guard::AuthGuard;
pub use latency::LatencyFloor;
pub use rate_limiter::{fingerprint, RateLimitDecision, RateLimitPolicy, RateLimiter};
pub use service::AuthService;
pub use traits::{send_in_background, EmailMessage, EmailSender, PasswordHasher};
