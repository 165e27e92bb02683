//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use ks_shared::error_codes;
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Storage layer failure or timeout. Never treated as "unauthenticated".
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Client-facing error code
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Storage { .. } => error_codes::STORAGE_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Auth(e) => e.code(),
            DomainError::Token(TokenError::SigningFailed)
            | DomainError::Token(TokenError::KeyMisconfigured { .. }) => {
                error_codes::INTERNAL_ERROR
            }
            DomainError::Token(e) => e.clone().into_access_error().code(),
        }
    }

    /// The wrapped auth error, if any
    pub fn as_auth(&self) -> Option<&AuthError> {
        match self {
            DomainError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
