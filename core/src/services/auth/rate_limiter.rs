//! Rate limiting trait for authentication endpoints

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ks_shared::WindowLimit;

use crate::errors::DomainError;

/// Endpoint classes with their own request budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitPolicy {
    Login,
    PasswordReset,
    VerificationResend,
}

impl RateLimitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPolicy::Login => "login",
            RateLimitPolicy::PasswordReset => "password_reset",
            RateLimitPolicy::VerificationResend => "verification_resend",
        }
    }

    /// Counter key for a caller under this policy
    pub fn key(&self, fingerprint: &str) -> String {
        format!("{}:{}", self.as_str(), fingerprint)
    }
}

/// Caller fingerprint: network origin plus client descriptor
pub fn fingerprint(origin: &str, user_agent: &str) -> String {
    format!("{}|{}", origin, user_agent)
}

/// Outcome of one counted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, at least 1
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let seconds = (self.reset_at - now).num_seconds();
        seconds.max(1) as u64
    }
}

/// Fixed-window request counter
///
/// Implementations count every call, including rejected ones.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn allow(&self, key: &str, limit: WindowLimit) -> Result<RateLimitDecision, DomainError>;
}
