//! Session store: the only writer of a credential's session list
//!
//! Every change is a read-modify-write against the credential record, made
//! safe by [`CredentialRepository::replace_sessions`]. On a version conflict
//! the credential is reloaded and the change reapplied, up to
//! [`MAX_WRITE_ATTEMPTS`] times.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::{Credential, Session, SessionList};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::CredentialRepository;

pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// What a session mutation decided
pub enum SessionChange<T> {
    /// Persist the edited list, then return the value
    Write(T),
    /// Nothing to persist
    Unchanged(T),
}

pub struct SessionStore {
    repository: Arc<dyn CredentialRepository>,
    clock: Arc<dyn Clock>,
    max_sessions: usize,
    session_ttl: Duration,
}

impl SessionStore {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        clock: Arc<dyn Clock>,
        max_sessions: usize,
        session_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            max_sessions,
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Applies `change` to the credential's sessions under compare-and-swap
    ///
    /// `change` may run more than once and must not have side effects beyond
    /// its arguments. A missing credential yields [`AuthError::UserNotFound`].
    pub async fn modify<T, F>(&self, id: Uuid, mut change: F) -> DomainResult<T>
    where
        F: FnMut(&Credential, &mut SessionList) -> DomainResult<SessionChange<T>> + Send,
        T: Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let credential = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or(AuthError::UserNotFound)?;

            let mut sessions = credential.sessions.clone();
            let value = match change(&credential, &mut sessions)? {
                SessionChange::Unchanged(value) => return Ok(value),
                SessionChange::Write(value) => value,
            };

            let written = self
                .repository
                .replace_sessions(id, credential.version, sessions)
                .await
                .map_err(|e| match e {
                    DomainError::NotFound { .. } => DomainError::Auth(AuthError::UserNotFound),
                    other => other,
                })?;
            if written {
                return Ok(value);
            }

            debug!(user_id = %id, attempt = attempt, "Session list changed underneath, retrying");
        }

        warn!(user_id = %id, "Gave up on session update after repeated version conflicts");
        Err(DomainError::storage("concurrent session update conflict"))
    }

    /// Records a new session, evicting the oldest beyond the cap
    pub async fn add_session(&self, id: Uuid, refresh_token: &str, device: &str) -> DomainResult<()> {
        let now = self.clock.now();
        let session = Session::new(refresh_token, device, now, self.session_ttl);
        let max = self.max_sessions;
        self.modify(id, |_, sessions| {
            sessions.add(session.clone(), max);
            Ok(SessionChange::Write(()))
        })
        .await
    }

    /// Removes the session holding `refresh_token`; returns whether one existed
    pub async fn remove_session(&self, id: Uuid, refresh_token: &str) -> DomainResult<bool> {
        self.modify(id, |_, sessions| {
            if sessions.remove_by_token(refresh_token) {
                Ok(SessionChange::Write(true))
            } else {
                Ok(SessionChange::Unchanged(false))
            }
        })
        .await
    }

    /// Removes a session by its identifier
    pub async fn revoke_session(&self, id: Uuid, session_id: Uuid) -> DomainResult<()> {
        self.modify(id, |_, sessions| {
            if sessions.remove_by_id(session_id) {
                Ok(SessionChange::Write(()))
            } else {
                Err(AuthError::SessionNotFound.into())
            }
        })
        .await
    }

    /// Drops every session; returns how many were removed
    pub async fn clear_all(&self, id: Uuid) -> DomainResult<usize> {
        self.modify(id, |_, sessions| {
            let removed = sessions.len();
            if removed == 0 {
                return Ok(SessionChange::Unchanged(0));
            }
            sessions.clear();
            Ok(SessionChange::Write(removed))
        })
        .await
    }

    /// Non-expired sessions, oldest first
    pub async fn list_active(&self, id: Uuid) -> DomainResult<Vec<Session>> {
        let credential = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(credential.sessions.active(self.clock.now()))
    }
}
