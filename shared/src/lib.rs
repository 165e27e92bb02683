//! Shared configuration and response types for the Keystone server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The uniform response envelope
//! - Error code constants surfaced to clients

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, Environment, JwtConfig, LockoutConfig, LogFormat, LoggingConfig,
    RateLimitConfig, ServerConfig, SessionConfig, WindowLimit,
};
pub use errors::error_codes;
pub use types::ApiResponse;
