//! Traits for password hashing and email integration

use std::sync::Arc;

use async_trait::async_trait;

/// Trait for password hashing
///
/// Both operations are CPU-bound; callers run them on the blocking pool.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash(&self, password: &str) -> Result<String, String>;
    /// Check a plaintext password against a stored hash in constant time
    fn verify(&self, password: &str, hash: &str) -> Result<bool, String>;
}

/// Outbound email notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailMessage {
    Welcome { to: String, pending_verification: bool },
    AccountLocked { to: String },
}

impl EmailMessage {
    pub fn recipient(&self) -> &str {
        match self {
            EmailMessage::Welcome { to, .. } | EmailMessage::AccountLocked { to } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EmailMessage::Welcome { .. } => "welcome",
            EmailMessage::AccountLocked { .. } => "account_locked",
        }
    }
}

/// Trait for email delivery integration
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), String>;
}

/// Sends `message` on a background task. Failures are logged, never returned.
pub fn send_in_background(sender: Arc<dyn EmailSender>, message: EmailMessage) {
    tokio::spawn(async move {
        let kind = message.kind();
        if let Err(e) = sender.send(message).await {
            tracing::warn!(kind = kind, error = %e, "Failed to send notification email");
        }
    });
}
