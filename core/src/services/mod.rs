//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{
    AccountLockPolicy, AuthGuard, AuthService, AuthServiceConfig, EmailMessage, EmailSender,
    PasswordHasher, RateLimitDecision, RateLimitPolicy, RateLimiter,
};
pub use session::SessionStore;
pub use token::{TokenService, TokenServiceConfig};
