//! Request authentication guard
//!
//! Turns an `Authorization` header into an [`Identity`], or into exactly one
//! taxonomy error. Steps run in order and stop at the first failure:
//!
//! 1. bearer token present, else `MISSING_TOKEN`
//! 2. access token verifies, else `TOKEN_EXPIRED` / `INVALID_TOKEN`
//! 3. credential exists, else `USER_NOT_FOUND`
//! 4. status is active, else `ACCOUNT_INACTIVE`
//! 5. not locked, else `ACCOUNT_LOCKED`
//!
//! Storage failures along the way are returned as they are, so the caller
//! answers 500 rather than 401.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::{Role, TokenKind};
use crate::domain::value_objects::Identity;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::CredentialRepository;
use crate::services::token::{extract_bearer, TokenService};

use super::account_lock::AccountLockPolicy;

pub struct AuthGuard {
    repository: Arc<dyn CredentialRepository>,
    token_service: Arc<TokenService>,
    lock_policy: AccountLockPolicy,
    clock: Arc<dyn Clock>,
}

impl AuthGuard {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        token_service: Arc<TokenService>,
        lock_policy: AccountLockPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            token_service,
            lock_policy,
            clock,
        }
    }

    /// Authenticates a request from its `Authorization` header value
    ///
    /// `origin` is recorded as the last-login origin on success.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        origin: &str,
    ) -> DomainResult<Identity> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(AuthError::MissingToken)?;

        let claims = self
            .token_service
            .verify(token, TokenKind::Access)
            .map_err(|e| DomainError::Auth(e.into_access_error()))?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let credential = self
            .repository
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Credential lookup failed during authentication");
                e
            })?
            .ok_or(AuthError::UserNotFound)?;

        if !credential.status.is_active() {
            debug!(user_id = %user_id, status = %credential.status, "Rejected token for inactive account");
            return Err(AuthError::AccountInactive.into());
        }
        let now = self.clock.now();
        if self.lock_policy.is_locked(&credential, now) {
            return Err(AuthError::AccountLocked.into());
        }

        if let Err(e) = self
            .repository
            .record_last_login(user_id, now, origin)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to record last login");
        }

        Ok(Identity::from(&credential))
    }

    /// Like [`authenticate`](Self::authenticate), but any failure yields `None`
    pub async fn authenticate_optional(
        &self,
        authorization: Option<&str>,
        origin: &str,
    ) -> Option<Identity> {
        authorization?;
        match self.authenticate(authorization, origin).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                if matches!(e, DomainError::Storage { .. }) {
                    error!(error = %e, "Optional authentication skipped after storage failure");
                }
                None
            }
        }
    }

    /// Second-stage role check on an already authenticated identity
    pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
        if identity.has_role(allowed) {
            Ok(())
        } else {
            warn!(user_id = %identity.user_id, role = %identity.role, "Insufficient permissions");
            Err(AuthError::InsufficientPermissions)
        }
    }
}
