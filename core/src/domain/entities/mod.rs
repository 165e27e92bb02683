//! Domain entities representing core business objects.

pub mod credential;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use credential::{normalize_email, AccountStatus, Credential, Role};
pub use session::{hash_refresh_token, Session, SessionList, MAX_SESSIONS};
pub use token::{Claims, TokenKind, TokenPair};
