//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token signing, session cookie and lockout configuration
//! - `environment` - environment detection and logging configuration
//! - `rate_limit` - fixed-window limits per endpoint class
//! - `server` - HTTP bind address

pub mod auth;
pub mod environment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig, LockoutConfig, SessionConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::{RateLimitConfig, WindowLimit};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            auth: AuthConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Checks the configuration for settings that must stop startup
    pub fn validate(&self) -> Result<(), String> {
        self.auth.jwt.validate()?;
        if self.environment.is_production() && self.auth.jwt.is_using_default_secrets() {
            return Err("default JWT secrets are not allowed in production".to_string());
        }
        Ok(())
    }
}

/// Reads and parses an environment variable, returning `default` when unset or invalid
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_rejects_default_secrets() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
