//! Shared test fakes and helpers.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::config::{Config, ContactValidation};
use crate::mail::{Email, MailError, Mailer};
use crate::server::AppState;
use crate::tasks::{QueueError, Task, TaskId, TaskQueue};
use crate::templates::{RenderError, Renderer, TemplateContext, TeraRenderer};

/// Renders `<template>|<context as JSON>`, so tests can assert exactly what
/// reached the renderer.
#[derive(Debug, Clone, Copy)]
pub struct StubRenderer;

impl Renderer for StubRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError> {
        let json = serde_json::to_string(context).map_err(|e| {
            RenderError::Tera(tera::Error::msg(format!("stub serialization failed: {e}")))
        })?;
        Ok(format!("{template}|{json}"))
    }
}

/// Records every task added, per queue name.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    added: Mutex<Vec<(String, Task)>>,
    fail: bool,
}

impl RecordingQueue {
    /// A queue whose `add` always fails.
    pub fn failing() -> Self {
        RecordingQueue {
            fail: true,
            ..Default::default()
        }
    }

    pub fn added(&self) -> Vec<(String, Task)> {
        self.added.lock().unwrap().clone()
    }
}

impl TaskQueue for RecordingQueue {
    fn add(&self, queue_name: &str, task: Task) -> Result<TaskId, QueueError> {
        if self.fail {
            return Err(QueueError::Closed(queue_name.to_string()));
        }
        let id = task.id().clone();
        self.added
            .lock()
            .unwrap()
            .push((queue_name.to_string(), task));
        Ok(id)
    }
}

/// Records every email sent.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    fail: bool,
}

impl RecordingMailer {
    /// A mailer whose `send` always fails.
    pub fn failing() -> Self {
        RecordingMailer {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Builds an app state over recording fakes and the given renderer.
pub fn test_state_with_renderer(
    renderer: Arc<dyn Renderer>,
) -> (AppState, Arc<RecordingQueue>, Arc<RecordingMailer>) {
    let queue = Arc::new(RecordingQueue::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(&Config::default(), renderer, queue.clone(), mailer.clone());
    (state, queue, mailer)
}

/// Builds an app state over recording fakes and the embedded templates.
pub fn test_state() -> (AppState, Arc<RecordingQueue>, Arc<RecordingMailer>) {
    test_state_with_renderer(Arc::new(TeraRenderer::embedded().unwrap()))
}

/// Like [`test_state`], with a specific contact validation policy.
pub fn test_state_with_validation(
    validation: ContactValidation,
) -> (AppState, Arc<RecordingQueue>, Arc<RecordingMailer>) {
    let mut config = Config::default();
    config.contact.validation = validation;
    let queue = Arc::new(RecordingQueue::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        &config,
        Arc::new(TeraRenderer::embedded().unwrap()),
        queue.clone(),
        mailer.clone(),
    );
    (state, queue, mailer)
}

/// A cookie jar as it would be extracted from a request carrying `cookies`.
pub fn jar_with(cookies: &[(&str, &str)]) -> CookieJar {
    let header = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&header).unwrap());
    CookieJar::from_headers(&headers)
}

/// Decoded value of the cookie `name` set by `response`, if any.
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse_encoded(v.to_string()).ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Minimal browser cookie store: remembers `Set-Cookie` values and replays
/// them on the next request.
#[derive(Debug, Default)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    /// Stores every cookie the response sets, as sent on the wire.
    pub fn absorb(&mut self, response: &Response) {
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    /// The `Cookie` header to send, if any cookies are stored.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
