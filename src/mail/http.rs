//! Mailer backed by an HTTP mail API.
//!
//! Sends `{"from", "to", "subject", "text"}` as JSON to the configured
//! endpoint, with an optional bearer token.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{Email, MailError, Mailer};

#[derive(Debug, Serialize)]
struct Payload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl<'a> From<&'a Email> for Payload<'a> {
    fn from(email: &'a Email) -> Self {
        Payload {
            from: &email.sender,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Self {
        HttpMailer {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_token,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&Payload::from(email));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint = %self.endpoint, to = %email.to, "Mail accepted by service");
        Ok(())
    }
}
