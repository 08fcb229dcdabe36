//! Contact form submission.
//!
//! `POST /contact` turns the form into a task on the mail queue and redirects
//! back to the contact page with a confirmation flash. The email itself is
//! sent later by the queue calling [`EMAIL_TASK_URL`].

use std::convert::Infallible;

use axum::extract::{Form, FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::{debug, error, info};

use super::AppState;
use super::handler::PageHandler;
use crate::config::ContactValidation;
use crate::tasks::{QueueError, Task};
use crate::templates::html_escape;

/// Where queued contact notifications are delivered.
pub const EMAIL_TASK_URL: &str = "/tasks/email/me";

/// Page the form redirects back to.
const CONTACT_PATH: &str = "/contact";

/// Error shown when a submission is rejected by [`ContactValidation::RequireAll`].
pub const INCOMPLETE_SUBMISSION: &str = "Please fill in your name, email and message.";

/// Errors that can occur while accepting a submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("failed to queue contact notification: {0}")]
    Queue(#[from] QueueError),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        error!(error = %self, "Contact submission failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Fields of the contact form.
///
/// Extracting never fails: missing fields read as empty strings, a repeated
/// field keeps its first value, and a body that is not a urlencoded form is
/// treated as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    /// Builds a submission from decoded form pairs, first occurrence wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let (mut name, mut email, mut message) = (None, None, None);
        for (key, value) in pairs {
            let field = match key.as_str() {
                "name" => &mut name,
                "email" => &mut email,
                "message" => &mut message,
                _ => continue,
            };
            field.get_or_insert(value);
        }

        ContactSubmission {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            message: message.unwrap_or_default(),
        }
    }

    /// True when no field is blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Builds the notification task carrying the fields verbatim.
    pub fn to_task(&self) -> Task {
        Task::new(EMAIL_TASK_URL)
            .param("name", &self.name)
            .param("email", &self.email)
            .param("message", &self.message)
    }

    /// Confirmation shown on the contact page after a successful submission.
    pub fn confirmation(&self) -> String {
        format!(
            "Thanks {}.  Message sent. I promise to reply within 24 hours.",
            html_escape(&self.name)
        )
    }
}

impl<S> FromRequest<S> for ContactSubmission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = match Form::<Vec<(String, String)>>::from_request(req, state).await {
            Ok(Form(pairs)) => pairs,
            Err(rejection) => {
                debug!(error = %rejection, "Unreadable form body, using empty fields");
                Vec::new()
            }
        };
        Ok(ContactSubmission::from_pairs(pairs))
    }
}

/// `POST /contact`
pub async fn contact_submit_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: ContactSubmission,
) -> Result<Response, ContactError> {
    let mut handler = PageHandler::new(&state, jar);

    if state.contact_validation() == ContactValidation::RequireAll && !submission.is_complete() {
        debug!("Rejecting incomplete contact submission");
        handler.add_error(INCOMPLETE_SUBMISSION);
        return Ok(handler.redirect(CONTACT_PATH));
    }

    debug!(
        name = %submission.name,
        email = %submission.email,
        message = %submission.message,
        "Adding contact message to queue"
    );
    let task_id = state.queue().add(state.queue_name(), submission.to_task())?;
    info!(task = %task_id, queue = %state.queue_name(), "Contact message queued");

    handler.add_flash(&submission.confirmation());
    Ok(handler.redirect(CONTACT_PATH))
}
