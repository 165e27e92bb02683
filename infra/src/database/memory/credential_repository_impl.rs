//! In-memory implementation of the CredentialRepository trait.
//!
//! Credentials live in a [`DashMap`] keyed by id, with a second map from
//! normalized email to id. Each operation holds a single shard lock for its
//! whole read-check-write. That keeps `create` unique per email and makes
//! `replace_sessions` a true compare-and-swap. Failed logins are counted
//! under the same lock, so concurrent attempts cannot overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use ks_core::domain::entities::{normalize_email, AccountStatus, Credential, SessionList};
use ks_core::errors::{AuthError, DomainError};
use ks_core::repositories::CredentialRepository;
use ks_core::services::auth::{AccountLockPolicy, LockOutcome};

/// In-memory implementation of CredentialRepository
#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    credentials: DashMap<Uuid, Credential>,
    email_index: DashMap<String, Uuid>,
}

impl InMemoryCredentialRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    fn not_found(id: Uuid) -> DomainError {
        DomainError::NotFound {
            resource: format!("Credential {}", id),
        }
    }

    /// Applies `update` to the stored credential under its shard lock and
    /// stamps `updated_at`
    fn update_with<T, F>(&self, id: Uuid, update: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Credential) -> T,
    {
        let mut credential = self
            .credentials
            .get_mut(&id)
            .ok_or_else(|| Self::not_found(id))?;
        let value = update(credential.value_mut());
        credential.updated_at = Utc::now();
        Ok(value)
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, DomainError> {
        Ok(self.credentials.get(&id).map(|c| c.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, DomainError> {
        let id = match self.email_index.get(&normalize_email(email)) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn create(&self, mut credential: Credential) -> Result<Credential, DomainError> {
        credential.email = normalize_email(&credential.email);

        match self.email_index.entry(credential.email.clone()) {
            Entry::Occupied(_) => Err(AuthError::EmailAlreadyRegistered.into()),
            Entry::Vacant(slot) => {
                self.credentials.insert(credential.id, credential.clone());
                slot.insert(credential.id);
                tracing::debug!(user_id = %credential.id, "Credential stored");
                Ok(credential)
            }
        }
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<LockOutcome, DomainError> {
        self.update_with(id, |c| policy.on_failed_login(c, now))
    }

    async fn clear_failed_logins(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        policy: &AccountLockPolicy,
    ) -> Result<bool, DomainError> {
        self.update_with(id, |c| {
            if policy.is_locked(c, now) {
                return false;
            }
            policy.on_successful_login(c);
            true
        })
    }

    async fn record_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        origin: &str,
    ) -> Result<(), DomainError> {
        self.update_with(id, |c| {
            c.last_login_at = Some(at);
            c.last_login_origin = Some(origin.to_string());
        })
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), DomainError> {
        self.update_with(id, |c| c.status = status)
    }

    async fn replace_sessions(
        &self,
        id: Uuid,
        expected_version: u64,
        sessions: SessionList,
    ) -> Result<bool, DomainError> {
        let mut credential = self
            .credentials
            .get_mut(&id)
            .ok_or_else(|| Self::not_found(id))?;

        if credential.version != expected_version {
            return Ok(false);
        }
        credential.sessions = sessions;
        credential.version += 1;
        credential.updated_at = Utc::now();
        Ok(true)
    }
}
