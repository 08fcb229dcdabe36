//! Mailer that only logs.

use async_trait::async_trait;
use tracing::info;

use super::{Email, MailError, Mailer};

/// Logs each message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(
            sender = %email.sender,
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Mail transport not configured, logging message"
        );
        Ok(())
    }
}
