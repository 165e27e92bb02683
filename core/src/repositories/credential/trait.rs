//! Credential repository trait defining the interface for credential persistence.
//!
//! Session lists are only ever written through [`CredentialRepository::replace_sessions`],
//! a compare-and-swap on the credential's `version`. Two concurrent refreshes
//! for the same user therefore cannot silently drop each other's rotation:
//! the loser sees `Ok(false)` and must reload and reapply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{AccountStatus, Credential, SessionList};
use crate::errors::DomainError;
use crate::services::auth::{AccountLockPolicy, LockOutcome};

/// Repository trait for Credential persistence operations
///
/// Any error other than the documented domain errors should be reported as
/// [`DomainError::Storage`]; callers treat it as a server failure, never as
/// "unauthenticated".
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Find a credential by its unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, DomainError>;

    /// Find a credential by email, ignoring case
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, DomainError>;

    /// Persist a new credential
    ///
    /// # Returns
    /// * `Ok(Credential)` - The stored credential
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyRegistered))` - Email taken
    async fn create(&self, credential: Credential) -> Result<Credential, DomainError>;

    /// Count one failed login against the stored credential
    ///
    /// `policy` is applied to the stored counter and lock while the credential
    /// is held for writing, so concurrent failures are all counted and exactly
    /// one of them reports [`LockOutcome::Locked`]. Does not touch sessions or
    /// `version`.
    async fn record_failed_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<LockOutcome, DomainError>;

    /// Reset the failed-login counter unless the account is locked at `now`
    ///
    /// # Returns
    /// * `Ok(true)` - Counter is zero and no lock is held
    /// * `Ok(false)` - Locked; nothing written
    async fn clear_failed_logins(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<bool, DomainError>;

    /// Record the last successful authentication
    async fn record_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        origin: &str,
    ) -> Result<(), DomainError>;

    /// Set the account status
    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), DomainError>;

    /// Replace the session list if the stored version still equals `expected_version`
    ///
    /// # Returns
    /// * `Ok(true)` - Written; the stored version was incremented
    /// * `Ok(false)` - Version mismatch, nothing written
    /// * `Err(DomainError::NotFound)` - No such credential
    async fn replace_sessions(
        &self,
        id: Uuid,
        expected_version: u64,
        sessions: SessionList,
    ) -> Result<bool, DomainError>;
}
