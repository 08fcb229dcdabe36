//! Queue-triggered contact notification.
//!
//! `POST /tasks/email/me` is called by the mail queue, not by browsers. It
//! mails the submitted message to the site owner. A failure answers 500 so the
//! queue redelivers the task.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info};

use super::AppState;
use super::contact::ContactSubmission;
use crate::mail::{Email, MailError};
use crate::tasks::delivery::{QUEUE_NAME_HEADER, RETRY_COUNT_HEADER, TASK_NAME_HEADER};

/// Errors that can occur while sending the notification.
#[derive(Debug, Error)]
pub enum EmailTaskError {
    #[error("failed to send contact notification: {0}")]
    Mail(#[from] MailError),
}

impl IntoResponse for EmailTaskError {
    fn into_response(self) -> Response {
        error!(error = %self, "Email task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Builds the owner notification for a submission.
pub fn notification_email(owner: &str, submission: &ContactSubmission) -> Email {
    let ContactSubmission {
        name,
        email,
        message,
    } = submission;

    Email {
        sender: owner.to_string(),
        to: owner.to_string(),
        subject: format!("Message from {name} ({email})"),
        body: format!("{name} ({email}): {message}"),
    }
}

/// `POST /tasks/email/me`
pub async fn email_me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    submission: ContactSubmission,
) -> Result<StatusCode, EmailTaskError> {
    debug!(
        queue = header(&headers, QUEUE_NAME_HEADER),
        task = header(&headers, TASK_NAME_HEADER),
        retry_count = header(&headers, RETRY_COUNT_HEADER),
        name = %submission.name,
        email = %submission.email,
        message = %submission.message,
        "Sending contact message"
    );

    let email = notification_email(state.owner(), &submission);
    state.mailer().send(&email).await?;

    info!(to = %email.to, subject = %email.subject, "Contact message sent");
    Ok(StatusCode::OK)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_has_owner_on_both_ends() {
        let submission = ContactSubmission {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            message: "hi".to_string(),
        };

        let email = notification_email("owner@example.com", &submission);
        assert_eq!(email.sender, "owner@example.com");
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.subject, "Message from Ada (ada@x.com)");
        assert_eq!(email.body, "Ada (ada@x.com): hi");
    }

    #[test]
    fn notification_keeps_fields_unescaped() {
        let submission = ContactSubmission {
            name: "<Ada>".to_string(),
            email: String::new(),
            message: "a & b".to_string(),
        };

        let email = notification_email("o@x", &submission);
        assert_eq!(email.subject, "Message from <Ada> ()");
        assert_eq!(email.body, "<Ada> (): a & b");
    }

    #[test]
    fn missing_header_reads_as_dash() {
        let headers = HeaderMap::new();
        assert_eq!(header(&headers, QUEUE_NAME_HEADER), "-");
    }
}
