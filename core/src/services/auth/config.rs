//! Configuration for the authentication service

use ks_shared::{AuthConfig, LockoutConfig};

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// New credentials start as pending until their email is verified
    pub require_email_verification: bool,
    /// Minimum duration of a failed login, in milliseconds
    pub min_failure_latency_ms: u64,
    /// Maximum concurrent sessions per credential
    pub max_sessions: usize,
    /// Lockout thresholds
    pub lockout: LockoutConfig,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            require_email_verification: config.require_email_verification,
            min_failure_latency_ms: config.min_failure_latency_ms,
            max_sessions: config.session.max_sessions,
            lockout: config.lockout.clone(),
        }
    }
}
