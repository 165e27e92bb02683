//! Logging Email Sender
//!
//! An email sender for development. It logs a masked recipient and the
//! message kind instead of handing the message to a mail provider.

use async_trait::async_trait;
use tracing::info;

use ks_core::services::auth::{EmailMessage, EmailSender};

/// Email sender that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

impl LoggingEmailSender {
    pub fn new() -> Self {
        Self
    }
}

/// Keeps the first character of the local part and the whole domain
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), String> {
        info!(
            kind = message.kind(),
            to = %mask_email(message.recipient()),
            "Email notification sent"
        );
        Ok(())
    }
}
