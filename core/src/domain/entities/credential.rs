//! Credential entity: a user's authentication record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AuthError;

use super::session::SessionList;

/// Authorization role carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Account status
///
/// Legal transitions:
/// - `Pending -> Active` (email verification)
/// - `Active -> Blocked` (admin action)
/// - `Blocked -> Active` (admin action)
///
/// Anything else, including blocking an account that was never active, is
/// rejected with [`AuthError::InvalidStatusTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Inactive,
    Blocked,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Pending -> Active
    pub fn activate(self) -> Result<Self, AuthError> {
        match self {
            AccountStatus::Pending => Ok(AccountStatus::Active),
            other => Err(other.transition_error(AccountStatus::Active)),
        }
    }

    /// Active -> Blocked
    pub fn block(self) -> Result<Self, AuthError> {
        match self {
            AccountStatus::Active => Ok(AccountStatus::Blocked),
            other => Err(other.transition_error(AccountStatus::Blocked)),
        }
    }

    /// Blocked -> Active
    pub fn unblock(self) -> Result<Self, AuthError> {
        match self {
            AccountStatus::Blocked => Ok(AccountStatus::Active),
            other => Err(other.transition_error(AccountStatus::Active)),
        }
    }

    fn transition_error(self, to: AccountStatus) -> AuthError {
        AuthError::InvalidStatusTransition {
            from: self.to_string(),
            to: to.to_string(),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Inactive => write!(f, "inactive"),
            AccountStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Lowercases and trims an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A user's authentication record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,

    /// Normalized (lowercase) email, unique across credentials
    pub email: String,

    /// Password hash; `None` for externally authenticated accounts
    pub password_hash: Option<String>,

    pub role: Role,

    pub status: AccountStatus,

    /// Consecutive failed logins
    pub failed_login_attempts: u32,

    /// Login is refused until this instant
    pub lock_until: Option<DateTime<Utc>>,

    /// Live refresh-token sessions
    pub sessions: SessionList,

    /// Bumped by every session list write; used for compare-and-swap
    pub version: u64,

    pub last_login_at: Option<DateTime<Utc>>,

    pub last_login_origin: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a new credential
    pub fn new(
        email: &str,
        password_hash: Option<String>,
        role: Role,
        status: AccountStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            role,
            status,
            failed_login_attempts: 0,
            lock_until: None,
            sessions: SessionList::default(),
            version: 0,
            last_login_at: None,
            last_login_origin: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account authenticates with a local password
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_credential() {
        let now = Utc::now();
        let credential = Credential::new(
            "  Alice@Example.COM ",
            Some("hash".to_string()),
            Role::User,
            AccountStatus::Active,
            now,
        );

        assert_eq!(credential.email, "alice@example.com");
        assert_eq!(credential.failed_login_attempts, 0);
        assert!(credential.lock_until.is_none());
        assert!(credential.sessions.is_empty());
        assert_eq!(credential.version, 0);
        assert!(credential.has_password());
        assert!(!credential.is_admin());
    }

    #[test]
    fn test_legal_status_transitions() {
        assert_eq!(AccountStatus::Pending.activate(), Ok(AccountStatus::Active));
        assert_eq!(AccountStatus::Active.block(), Ok(AccountStatus::Blocked));
        assert_eq!(AccountStatus::Blocked.unblock(), Ok(AccountStatus::Active));
    }

    #[test]
    fn test_illegal_status_transitions() {
        assert!(AccountStatus::Pending.block().is_err());
        assert!(AccountStatus::Active.activate().is_err());
        assert!(AccountStatus::Active.unblock().is_err());
        assert!(AccountStatus::Inactive.block().is_err());

        let err = AccountStatus::Pending.block().unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidStatusTransition {
                from: "pending".to_string(),
                to: "blocked".to_string(),
            }
        );
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&AccountStatus::Blocked).unwrap(),
            "\"blocked\""
        );
    }
}
