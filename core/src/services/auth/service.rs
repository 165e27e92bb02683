//! Main authentication service implementation

use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::{
    normalize_email, AccountStatus, Credential, Role, Session, TokenKind, TokenPair,
};
use crate::domain::value_objects::Identity;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::CredentialRepository;
use crate::services::session::{SessionChange, SessionStore};
use crate::services::token::TokenService;

use super::account_lock::{AccountLockPolicy, LockOutcome};
use super::config::AuthServiceConfig;
use super::latency::LatencyFloor;
use super::traits::{send_in_background, EmailMessage, EmailSender, PasswordHasher};

/// Password checked against when the email is unknown, so the miss costs one hash
const DUMMY_PASSWORD: &str = "keystone-dummy-password";

/// Authentication service for login, token rotation and session management
///
/// The only component that writes session lists.
pub struct AuthService {
    /// Credential persistence
    repository: Arc<dyn CredentialRepository>,
    /// Token codec
    token_service: Arc<TokenService>,
    /// Password hashing, run on the blocking pool
    hasher: Arc<dyn PasswordHasher>,
    /// Fire-and-forget notifications
    email_sender: Arc<dyn EmailSender>,
    sessions: SessionStore,
    lock_policy: AccountLockPolicy,
    latency_floor: LatencyFloor,
    clock: Arc<dyn Clock>,
    dummy_hash: OnceCell<String>,
    config: AuthServiceConfig,
}

impl AuthService {
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `repository` - Credential persistence
    /// * `token_service` - Token codec; its refresh lifetime is also the session lifetime
    /// * `hasher` - Password hasher
    /// * `email_sender` - Outbound notifications
    /// * `clock` - Time source for lockout and session expiry
    /// * `config` - Service configuration
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        token_service: Arc<TokenService>,
        hasher: Arc<dyn PasswordHasher>,
        email_sender: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        let sessions = SessionStore::new(
            repository.clone(),
            clock.clone(),
            config.max_sessions,
            token_service.refresh_token_ttl(),
        );
        Self {
            sessions,
            lock_policy: AccountLockPolicy::from(&config.lockout),
            latency_floor: LatencyFloor::from_millis(config.min_failure_latency_ms),
            dummy_hash: OnceCell::new(),
            repository,
            token_service,
            hasher,
            email_sender,
            clock,
            config,
        }
    }

    /// Lockout policy used by this service, for building a matching guard
    pub fn lock_policy(&self) -> &AccountLockPolicy {
        &self.lock_policy
    }

    /// Register a new password credential
    ///
    /// The account starts `pending` when email verification is required,
    /// `active` otherwise.
    ///
    /// # Returns
    ///
    /// * `Ok(Credential)` - The stored credential
    /// * `Err(AuthError::EmailAlreadyRegistered)` - Email taken
    pub async fn register(&self, email: &str, password: &str) -> DomainResult<Credential> {
        let password_hash = self.hash_password(password).await?;
        let status = if self.config.require_email_verification {
            AccountStatus::Pending
        } else {
            AccountStatus::Active
        };

        let credential = Credential::new(
            email,
            Some(password_hash),
            Role::User,
            status,
            self.clock.now(),
        );
        let credential = self.repository.create(credential).await?;

        info!(user_id = %credential.id, status = %credential.status, "Credential registered");
        send_in_background(
            self.email_sender.clone(),
            EmailMessage::Welcome {
                to: credential.email.clone(),
                pending_verification: status == AccountStatus::Pending,
            },
        );

        Ok(credential)
    }

    /// Authenticate with email and password
    ///
    /// Unknown email and wrong password both answer `INVALID_CREDENTIALS`, and
    /// every failure is held to the same minimum latency. A lock always wins
    /// over a correct password; account status is only revealed after the
    /// password has matched.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access and refresh token for `device`
    /// * `Err(AuthError::InvalidCredentials)` - Unknown email or wrong password
    /// * `Err(AuthError::AccountLocked)` - Locked, or this attempt caused the lock
    /// * `Err(AuthError::EmailNotVerified | AccountInactive)` - Status is not active
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: &str,
        origin: &str,
    ) -> DomainResult<TokenPair> {
        let started = Instant::now();
        let result = self.attempt_login(email, password, device, origin).await;
        if result.is_err() {
            self.latency_floor.pad(started).await;
        }
        result
    }

    async fn attempt_login(
        &self,
        email: &str,
        password: &str,
        device: &str,
        origin: &str,
    ) -> DomainResult<TokenPair> {
        let email = normalize_email(email);
        let credential = self.repository.find_by_email(&email).await?;

        let credential = match credential {
            Some(c) if c.has_password() => c,
            _ => {
                // Burn the same hashing cost as a real check
                let dummy = self.dummy_hash().await?;
                self.verify_password(password, &dummy).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if self.lock_policy.is_locked(&credential, self.clock.now()) {
            warn!(user_id = %credential.id, "Login attempt on locked account");
            return Err(AuthError::AccountLocked.into());
        }

        let stored_hash = credential.password_hash.clone().unwrap_or_default();
        if !self.verify_password(password, &stored_hash).await? {
            // Counted against the stored state; the copy above may be stale
            let outcome = self
                .repository
                .record_failed_login(credential.id, self.clock.now(), &self.lock_policy)
                .await?;

            return match outcome {
                LockOutcome::Locked { until } => {
                    warn!(user_id = %credential.id, lock_until = %until, "Account locked after repeated failed logins");
                    send_in_background(
                        self.email_sender.clone(),
                        EmailMessage::AccountLocked {
                            to: credential.email.clone(),
                        },
                    );
                    Err(AuthError::AccountLocked.into())
                }
                LockOutcome::AlreadyLocked => {
                    warn!(user_id = %credential.id, "Failed login on account locked by a concurrent attempt");
                    Err(AuthError::AccountLocked.into())
                }
                LockOutcome::Counted { failed_attempts } => {
                    warn!(
                        user_id = %credential.id,
                        failed_attempts = failed_attempts,
                        "Failed login"
                    );
                    Err(AuthError::InvalidCredentials.into())
                }
            };
        }

        match credential.status {
            AccountStatus::Active => {}
            AccountStatus::Pending => return Err(AuthError::EmailNotVerified.into()),
            AccountStatus::Inactive | AccountStatus::Blocked => {
                return Err(AuthError::AccountInactive.into())
            }
        }

        // A lock taken while the password was being checked still wins
        let now = self.clock.now();
        if !self
            .repository
            .clear_failed_logins(credential.id, now, &self.lock_policy)
            .await?
        {
            warn!(user_id = %credential.id, "Account locked during login");
            return Err(AuthError::AccountLocked.into());
        }

        let pair = self.token_service.issue_token_pair(&credential, device)?;
        self.sessions
            .add_session(credential.id, &pair.refresh_token, device)
            .await?;

        if let Err(e) = self
            .repository
            .record_last_login(credential.id, now, origin)
            .await
        {
            warn!(user_id = %credential.id, error = %e, "Failed to record last login");
        }

        info!(user_id = %credential.id, "Login succeeded");
        Ok(pair)
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The presented token's session is rotated in place, so the presented
    /// token stops working immediately even though it has not expired.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New access token and rotated refresh token
    /// * `Err(AuthError::InvalidRefreshToken)` - Bad signature, expired,
    ///   already rotated, logged out or unknown credential
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self
            .token_service
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| DomainError::Auth(e.into_refresh_error()))?;
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let now = self.clock.now();
        let ttl = self.sessions.session_ttl();
        let token_service = &self.token_service;
        let lock_policy = &self.lock_policy;

        let pair = self
            .sessions
            .modify(user_id, |credential, sessions| {
                let index = sessions
                    .find(refresh_token, now)
                    .ok_or(AuthError::InvalidRefreshToken)?;
                if !credential.status.is_active() {
                    return Err(AuthError::AccountInactive.into());
                }
                if lock_policy.is_locked(credential, now) {
                    return Err(AuthError::AccountLocked.into());
                }

                let device = sessions
                    .get(index)
                    .map(|s| s.device.clone())
                    .unwrap_or_default();
                let pair = token_service.issue_token_pair(credential, &device)?;
                sessions.replace(index, &pair.refresh_token, &device, now, ttl);
                Ok(SessionChange::Write(pair))
            })
            .await
            .map_err(|e| match e {
                DomainError::Auth(AuthError::UserNotFound) => {
                    DomainError::Auth(AuthError::InvalidRefreshToken)
                }
                other => other,
            })?;

        info!(user_id = %user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// End the session holding `refresh_token`
    ///
    /// Succeeds whether or not the session still exists.
    pub async fn logout(&self, identity: &Identity, refresh_token: Option<&str>) -> DomainResult<()> {
        let Some(token) = refresh_token else {
            return Ok(());
        };
        match self.sessions.remove_session(identity.user_id, token).await {
            Ok(removed) => {
                info!(user_id = %identity.user_id, removed = removed, "Logout");
                Ok(())
            }
            Err(DomainError::Auth(AuthError::UserNotFound)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// End every session of the identity
    pub async fn logout_all(&self, identity: &Identity) -> DomainResult<usize> {
        let removed = self.sessions.clear_all(identity.user_id).await?;
        info!(user_id = %identity.user_id, removed = removed, "Logged out of all sessions");
        Ok(removed)
    }

    /// Live sessions of the identity, oldest first
    pub async fn list_sessions(&self, identity: &Identity) -> DomainResult<Vec<Session>> {
        self.sessions.list_active(identity.user_id).await
    }

    /// Revoke one of the identity's sessions by id
    pub async fn revoke_session(&self, identity: &Identity, session_id: Uuid) -> DomainResult<()> {
        self.sessions
            .revoke_session(identity.user_id, session_id)
            .await?;
        info!(user_id = %identity.user_id, session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Mark a pending account's email as verified
    pub async fn activate(&self, user_id: Uuid) -> DomainResult<AccountStatus> {
        self.transition(user_id, AccountStatus::activate).await
    }

    /// Block an active account and end all of its sessions
    pub async fn block(&self, user_id: Uuid) -> DomainResult<AccountStatus> {
        let status = self.transition(user_id, AccountStatus::block).await?;
        let removed = self.sessions.clear_all(user_id).await?;
        info!(user_id = %user_id, sessions_removed = removed, "Account blocked");
        Ok(status)
    }

    /// Unblock a blocked account
    pub async fn unblock(&self, user_id: Uuid) -> DomainResult<AccountStatus> {
        let status = self.transition(user_id, AccountStatus::unblock).await?;
        info!(user_id = %user_id, "Account unblocked");
        Ok(status)
    }

    async fn transition(
        &self,
        user_id: Uuid,
        apply: fn(AccountStatus) -> Result<AccountStatus, AuthError>,
    ) -> DomainResult<AccountStatus> {
        let credential = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let status = apply(credential.status)?;
        self.repository.update_status(user_id, status).await?;
        Ok(status)
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing failed: {}", e),
            })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("password verification task failed: {}", e),
            })?;
        // An unparsable stored hash is a mismatch, not a server error
        Ok(verified.unwrap_or(false))
    }

    async fn dummy_hash(&self) -> DomainResult<String> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await
            .cloned()
    }
}
