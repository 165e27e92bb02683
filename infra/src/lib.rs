//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Keystone server.
//! It provides concrete implementations of the ports the core declares.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: in-process credential store with optimistic versioning
//! - **Services**: fixed-window rate limiter and bcrypt password hasher
//! - **Email**: notification sender that writes to the log
//!
//! All state is process-local; a multi-instance deployment needs shared
//! implementations of the same traits.

use std::sync::Arc;

use ks_core::{Clock, CredentialRepository, EmailSender, PasswordHasher, RateLimiter};

// Re-export core types for convenience
pub use ks_core::errors::*;

/// Database module - credential persistence
pub mod database;

/// Email module - outbound notifications
pub mod email;

/// Services module - Infrastructure service implementations
pub mod services;

pub use database::InMemoryCredentialRepository;
pub use email::LoggingEmailSender;
pub use services::auth::{BcryptPasswordHasher, InMemoryRateLimiter};

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    pub credentials: Arc<dyn CredentialRepository>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub email_sender: Arc<dyn EmailSender>,
    memory_limiter: Option<Arc<InMemoryRateLimiter>>,
}

impl InfrastructureServices {
    /// Process-local adapters sharing one clock
    pub fn in_memory(clock: Arc<dyn Clock>, bcrypt_cost: u32) -> Result<Self, InfrastructureError> {
        tracing::info!("Initializing in-memory infrastructure services...");

        let password_hasher = BcryptPasswordHasher::with_cost(bcrypt_cost)?;
        let limiter = Arc::new(InMemoryRateLimiter::new(clock));

        Ok(Self {
            credentials: Arc::new(InMemoryCredentialRepository::new()),
            rate_limiter: limiter.clone(),
            password_hasher: Arc::new(password_hasher),
            email_sender: Arc::new(LoggingEmailSender::new()),
            memory_limiter: Some(limiter),
        })
    }

    /// Starts periodic cleanup for the process-local adapters that need it
    pub fn start_maintenance(&self, every: std::time::Duration) {
        if let Some(limiter) = &self.memory_limiter {
            limiter.clone().start_purge_task(every);
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email delivery error
    #[error("Email error: {0}")]
    Email(String),
}
