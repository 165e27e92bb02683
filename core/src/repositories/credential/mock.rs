//! Mock implementation of CredentialRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{normalize_email, AccountStatus, Credential, SessionList};
use crate::errors::{AuthError, DomainError};
use crate::services::auth::{AccountLockPolicy, LockOutcome};

use super::trait_::CredentialRepository;

/// Mock credential repository for testing
///
/// Reads and writes can be made to fail, and the next few session writes can
/// be made to lose their compare-and-swap as if another request won the race.
#[derive(Default)]
pub struct MockCredentialRepository {
    credentials: Arc<RwLock<HashMap<Uuid, Credential>>>,
    fail_reads: AtomicBool,
    fail_login_recording: AtomicBool,
    forced_conflicts: AtomicU32,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a credential directly, bypassing duplicate checks
    pub async fn insert(&self, credential: Credential) {
        self.credentials
            .write()
            .await
            .insert(credential.id, credential);
    }

    pub async fn get(&self, id: Uuid) -> Option<Credential> {
        self.credentials.read().await.get(&id).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_login_recording(&self, fail: bool) {
        self.fail_login_recording.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` session writes report a version conflict
    pub fn force_conflicts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::storage("simulated read timeout"));
        }
        Ok(())
    }

    fn not_found() -> DomainError {
        DomainError::NotFound {
            resource: "Credential".to_string(),
        }
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, DomainError> {
        self.check_reads()?;
        Ok(self.credentials.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, DomainError> {
        self.check_reads()?;
        let email = normalize_email(email);
        Ok(self
            .credentials
            .read()
            .await
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn create(&self, credential: Credential) -> Result<Credential, DomainError> {
        let mut credentials = self.credentials.write().await;
        if credentials.values().any(|c| c.email == credential.email) {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }
        credentials.insert(credential.id, credential.clone());
        Ok(credential)
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<LockOutcome, DomainError> {
        let mut credentials = self.credentials.write().await;
        let credential = credentials.get_mut(&id).ok_or_else(Self::not_found)?;
        Ok(policy.on_failed_login(credential, now))
    }

    async fn clear_failed_logins(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<bool, DomainError> {
        let mut credentials = self.credentials.write().await;
        let credential = credentials.get_mut(&id).ok_or_else(Self::not_found)?;
        if policy.is_locked(credential, now) {
            return Ok(false);
        }
        policy.on_successful_login(credential);
        Ok(true)
    }

    async fn record_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        origin: &str,
    ) -> Result<(), DomainError> {
        if self.fail_login_recording.load(Ordering::SeqCst) {
            return Err(DomainError::storage("simulated write failure"));
        }
        let mut credentials = self.credentials.write().await;
        let credential = credentials.get_mut(&id).ok_or_else(Self::not_found)?;
        credential.last_login_at = Some(at);
        credential.last_login_origin = Some(origin.to_string());
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), DomainError> {
        let mut credentials = self.credentials.write().await;
        let credential = credentials.get_mut(&id).ok_or_else(Self::not_found)?;
        credential.status = status;
        Ok(())
    }

    async fn replace_sessions(
        &self,
        id: Uuid,
        expected_version: u64,
        sessions: SessionList,
    ) -> Result<bool, DomainError> {
        let mut credentials = self.credentials.write().await;
        let credential = credentials.get_mut(&id).ok_or_else(Self::not_found)?;

        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            // Simulate a concurrent writer landing first
            credential.version += 1;
            return Ok(false);
        }

        if credential.version != expected_version {
            return Ok(false);
        }
        credential.sessions = sessions;
        credential.version += 1;
        Ok(true)
    }
}
