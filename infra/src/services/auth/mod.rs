//! Authentication-related infrastructure services

pub mod password_hasher;
pub mod rate_limiter;


pub use password_hasher::BcryptPasswordHasher;
pub use rate_limiter::InMemoryRateLimiter;
