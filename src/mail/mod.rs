//! Outbound mail.
//!
//! The email worker hands an [`Email`] to a [`Mailer`]. Which transport sits
//! behind the trait is decided once at startup by [`from_config`]:
//!
//! - [`HttpMailer`]: POSTs to a transactional mail API when `mail.endpoint` is set
//! - [`LogMailer`]: writes the message to the log otherwise (local development)

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

pub mod http;
pub mod log;

pub use self::http::HttpMailer;
pub use self::log::LogMailer;

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub sender: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors that can occur while sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// The mail API could not be reached.
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The mail API answered with a non-success status.
    #[error("mail service rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sends email through some external service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Picks the transport for the given configuration.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(HttpMailer::new(endpoint.clone(), config.api_token.clone())),
        None => Arc::new(LogMailer),
    }
}
