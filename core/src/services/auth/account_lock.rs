//! Account lockout policy for brute force protection
//!
//! Pure state transitions over a credential's failed-login counter and lock
//! expiry. The lock heals itself: once `lock_until` has passed, the next failed
//! attempt starts a fresh count instead of extending the lock.

use chrono::{DateTime, Duration, Utc};
use ks_shared::LockoutConfig;

use crate::domain::entities::Credential;

/// Result of recording a failed login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Counter incremented, account still usable
    Counted { failed_attempts: u32 },
    /// This attempt crossed the threshold and locked the account
    Locked { until: DateTime<Utc> },
    /// Account was already locked; counter incremented only
    AlreadyLocked,
}

/// Lockout thresholds
#[derive(Debug, Clone)]
pub struct AccountLockPolicy {
    max_failed_attempts: u32,
    lock_duration: Duration,
}

impl Default for AccountLockPolicy {
    fn default() -> Self {
        Self::from(&LockoutConfig::default())
    }
}

impl From<&LockoutConfig> for AccountLockPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_attempts.max(1),
            lock_duration: Duration::seconds(config.lock_duration_seconds),
        }
    }
}

impl AccountLockPolicy {
    pub fn is_locked(&self, credential: &Credential, now: DateTime<Utc>) -> bool {
        matches!(credential.lock_until, Some(until) if until > now)
    }

    /// Records one failed login on `credential`
    pub fn on_failed_login(&self, credential: &mut Credential, now: DateTime<Utc>) -> LockOutcome {
        match credential.lock_until {
            Some(until) if until <= now => {
                credential.lock_until = None;
                credential.failed_login_attempts = 1;
            }
            _ => {
                credential.failed_login_attempts = credential.failed_login_attempts.saturating_add(1);
            }
        }

        if self.is_locked(credential, now) {
            return LockOutcome::AlreadyLocked;
        }
        if credential.failed_login_attempts >= self.max_failed_attempts {
            let until = now + self.lock_duration;
            credential.lock_until = Some(until);
            return LockOutcome::Locked { until };
        }
        LockOutcome::Counted {
            failed_attempts: credential.failed_login_attempts,
        }
    }

    /// Clears counter and lock; returns whether anything changed
    pub fn on_successful_login(&self, credential: &mut Credential) -> bool {
        if credential.failed_login_attempts == 0 {
            return false;
        }
        credential.failed_login_attempts = 0;
        credential.lock_until = None;
        true
    }
}
