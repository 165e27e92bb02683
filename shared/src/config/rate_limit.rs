//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// A fixed-window limit: at most `max_requests` per `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowLimit {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl WindowLimit {
    pub const fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }
}

/// Rate limiting configuration per endpoint class
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Authentication attempts (login, register, refresh)
    pub login: WindowLimit,

    /// Password-reset requests
    pub password_reset: WindowLimit,

    /// Email-verification resends
    pub verification_resend: WindowLimit,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            login: WindowLimit::new(5, 15 * 60),
            password_reset: WindowLimit::new(3, 3600),
            verification_resend: WindowLimit::new(3, 10 * 60),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            login: WindowLimit::new(
                env_or("RATE_LIMIT_LOGIN_MAX", defaults.login.max_requests),
                env_or("RATE_LIMIT_LOGIN_WINDOW", defaults.login.window_seconds),
            ),
            ..defaults
        }
    }

    /// Configuration with limiting switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.login, WindowLimit::new(5, 900));
        assert_eq!(config.password_reset, WindowLimit::new(3, 3600));
        assert_eq!(config.verification_resend, WindowLimit::new(3, 600));
    }
}
