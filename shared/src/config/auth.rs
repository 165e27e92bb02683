//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// JWT signing configuration
///
/// Access and refresh tokens are signed with separate secrets so that a leak
/// of one cannot be used to mint the other kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 24 * 3600,       // 24 hours
            refresh_token_expiry: 30 * 24 * 3600, // 30 days
            issuer: String::from("keystone"),
            audience: String::from("keystone-api"),
        }
    }
}

impl JwtConfig {
    /// Create a JWT configuration with explicit secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in hours
    pub fn with_access_expiry_hours(mut self, hours: i64) -> Self {
        self.access_token_expiry = hours * 3600;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using the built-in development secrets
    pub fn is_using_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Rejects empty or shared signing secrets
    pub fn validate(&self) -> Result<(), String> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err("JWT signing secrets must not be empty".to_string());
        }
        if self.access_secret == self.refresh_secret {
            return Err("access and refresh tokens must use different signing secrets".to_string());
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err("token expiry must be positive".to_string());
        }
        Ok(())
    }
}

/// Refresh-token session and cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions per credential
    pub max_sessions: usize,

    /// Name of the cookie carrying the refresh token
    pub cookie_name: String,

    /// Cookie max-age in days, clamped to 7..=30
    pub cookie_max_age_days: i64,

    /// Cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Cookie HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// Cookie SameSite attribute
    pub same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 5,
            cookie_name: String::from("refresh_token"),
            cookie_max_age_days: 30,
            secure: false, // Set to true in production
            http_only: default_http_only(),
            same_site: String::from("Strict"),
        }
    }
}

impl SessionConfig {
    /// Cookie max-age in seconds after clamping to the allowed 7-30 day range
    pub fn cookie_max_age_seconds(&self) -> i64 {
        self.cookie_max_age_days.clamp(7, 30) * 86400
    }
}

/// Account lockout policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Consecutive failed logins before the account is locked
    pub max_failed_attempts: u32,

    /// Lock duration in seconds
    pub lock_duration_seconds: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lock_duration_seconds: 2 * 3600, // 2 hours
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub lockout: LockoutConfig,

    /// New credentials start as `pending` instead of `active`
    #[serde(default)]
    pub require_email_verification: bool,

    /// Minimum duration of a failed login response, in milliseconds
    #[serde(default = "default_min_failure_latency_ms")]
    pub min_failure_latency_ms: u64,

    /// bcrypt work factor for stored password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
            lockout: LockoutConfig::default(),
            require_email_verification: false,
            min_failure_latency_ms: default_min_failure_latency_ms(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let session_defaults = SessionConfig::default();
        let lockout_defaults = LockoutConfig::default();

        Self {
            jwt: JwtConfig {
                access_secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret),
                refresh_secret: std::env::var("JWT_REFRESH_SECRET")
                    .unwrap_or(defaults.refresh_secret),
                access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
                refresh_token_expiry: env_or(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    defaults.refresh_token_expiry,
                ),
                issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
                audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            },
            session: SessionConfig {
                max_sessions: env_or("SESSION_MAX_PER_USER", session_defaults.max_sessions),
                cookie_max_age_days: env_or(
                    "SESSION_COOKIE_MAX_AGE_DAYS",
                    session_defaults.cookie_max_age_days,
                ),
                secure: env_or("SESSION_COOKIE_SECURE", session_defaults.secure),
                ..session_defaults
            },
            lockout: LockoutConfig {
                max_failed_attempts: env_or(
                    "LOCKOUT_MAX_FAILED_ATTEMPTS",
                    lockout_defaults.max_failed_attempts,
                ),
                lock_duration_seconds: env_or(
                    "LOCKOUT_DURATION_SECONDS",
                    lockout_defaults.lock_duration_seconds,
                ),
            },
            require_email_verification: env_or("REQUIRE_EMAIL_VERIFICATION", false),
            min_failure_latency_ms: env_or(
                "MIN_FAILURE_LATENCY_MS",
                default_min_failure_latency_ms(),
            ),
            bcrypt_cost: env_or("BCRYPT_COST", default_bcrypt_cost()),
        }
    }
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_http_only() -> bool {
    true
}

fn default_min_failure_latency_ms() -> u64 {
    250
}
