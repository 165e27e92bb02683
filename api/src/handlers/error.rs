//! Domain error to HTTP response mapping
//!
//! Every failure leaves the API as the uniform envelope
//! `{success: false, message, error}` where `error` is the taxonomy code.
//! Storage and internal failures are logged with their detail and surfaced
//! with a generic message.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use ks_core::errors::{AuthError, DomainError, TokenError};
use ks_shared::{error_codes, ApiResponse};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by handlers and middleware
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] DomainError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(DomainError::Validation {
            message: message.into(),
        })
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError(DomainError::NotFound {
            resource: resource.into(),
        })
    }

    pub fn domain(&self) -> &DomainError {
        &self.0
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError(DomainError::Auth(error))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::validation(errors.to_string())
    }
}

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Storage { .. } | DomainError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DomainError::Token(TokenError::SigningFailed)
        | DomainError::Token(TokenError::KeyMisconfigured { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(auth) => match auth {
            AuthError::AccountLocked => StatusCode::LOCKED,
            AuthError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyRegistered | AuthError::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            AuthError::SessionNotFound => StatusCode::NOT_FOUND,
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken
            | AuthError::UserNotFound
            | AuthError::AccountInactive
            | AuthError::EmailNotVerified
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        },
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let code = self.0.code();

        let message = if status.is_server_error() {
            tracing::error!(code, error = %self.0, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };

        let mut response = HttpResponse::build(status);
        if let DomainError::Auth(AuthError::RateLimitExceeded {
            retry_after_seconds,
        }) = &self.0
        {
            response.insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()));
        }
        response.json(ApiResponse::<()>::error(code, message))
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
