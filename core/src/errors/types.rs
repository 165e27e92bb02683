//! Authentication and token error types
//!
//! Each [`AuthError`] maps to exactly one client-facing code. Messages are kept
//! generic on purpose: nothing here says why an account is locked or whether
//! an email is registered.

use ks_shared::error_codes;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication token is missing")]
    MissingToken,

    #[error("Access token has expired")]
    TokenExpired,

    #[error("Access token is invalid")]
    InvalidToken,

    #[error("Refresh token is invalid or has expired")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Too many requests, retry in {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Email address is already registered")]
    EmailAlreadyRegistered,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Cannot change account status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}

impl AuthError {
    /// Client-facing error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => error_codes::MISSING_TOKEN,
            AuthError::TokenExpired => error_codes::TOKEN_EXPIRED,
            AuthError::InvalidToken => error_codes::INVALID_TOKEN,
            AuthError::InvalidRefreshToken => error_codes::INVALID_REFRESH_TOKEN,
            AuthError::UserNotFound => error_codes::USER_NOT_FOUND,
            AuthError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            AuthError::EmailNotVerified => error_codes::EMAIL_NOT_VERIFIED,
            AuthError::AccountLocked => error_codes::ACCOUNT_LOCKED,
            AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AuthError::RateLimitExceeded { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            AuthError::InsufficientPermissions => error_codes::INSUFFICIENT_PERMISSIONS,
            AuthError::EmailAlreadyRegistered => error_codes::EMAIL_ALREADY_REGISTERED,
            AuthError::SessionNotFound => error_codes::SESSION_NOT_FOUND,
            AuthError::InvalidStatusTransition { .. } => error_codes::INVALID_STATUS_TRANSITION,
        }
    }
}

/// Token codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token is malformed or its signature is invalid")]
    Malformed,

    #[error("Token kind does not match")]
    WrongKind,

    #[error("Token signing failed")]
    SigningFailed,

    #[error("Signing keys are misconfigured: {reason}")]
    KeyMisconfigured { reason: String },
}

impl TokenError {
    /// Error surfaced when this failure happens while checking an access token
    pub fn into_access_error(self) -> AuthError {
        match self {
            TokenError::Expired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }

    /// Error surfaced when this failure happens while checking a refresh token
    pub fn into_refresh_error(self) -> AuthError {
        AuthError::InvalidRefreshToken
    }
}
