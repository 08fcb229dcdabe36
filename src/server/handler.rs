//! Per-request page handler.
//!
//! [`PageHandler`] bundles what every page needs for one request: a fresh
//! [`TemplateContext`] seeded with the site metadata, the request's message
//! cookies, and the renderer. Handlers build one, optionally add values or
//! messages, and finish with [`render`](PageHandler::render) or
//! [`redirect`](PageHandler::redirect), both of which consume it so nothing can
//! be written after the response.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::{debug, error};

use super::AppState;
use crate::messages::{MessageSlot, MessageStore};
use crate::templates::{RenderError, Renderer, TEMPLATE_NAME_KEY, TemplateContext, WRAPPER_TEMPLATE};

/// Errors that can occur while producing a page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to render page: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %self, "Page rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub struct PageHandler {
    context: TemplateContext,
    messages: MessageStore,
    renderer: Arc<dyn Renderer>,
}

impl PageHandler {
    /// Starts handling a request that arrived with `jar`.
    pub fn new(state: &AppState, jar: CookieJar) -> Self {
        PageHandler {
            context: TemplateContext::for_site(state.site()),
            messages: MessageStore::new(jar),
            renderer: state.renderer(),
        }
    }

    /// Inserts or overwrites a template value for this request.
    pub fn add_template_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.insert(key, value);
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Moves any pending flash and error messages into the template context
    /// and clears their cookies, so each is shown once.
    pub fn maybe_show_flash(&mut self) {
        for (slot, key) in [(MessageSlot::Flash, "flash"), (MessageSlot::Error, "error")] {
            if let Some(message) = self.messages.take(slot) {
                debug!(slot = key, "Showing pending message");
                self.context.insert(key, message);
            }
        }
    }

    pub fn add_flash(&mut self, message: &str) {
        self.messages.add_flash(message);
    }

    pub fn add_error(&mut self, message: &str) {
        self.messages.add_error(message);
    }

    pub fn add_extra_data(&mut self, message: &str) {
        self.messages.add_extra_data(message);
    }

    pub fn clear_flash(&mut self) {
        self.messages.clear_flash();
    }

    pub fn clear_error(&mut self) {
        self.messages.clear_error();
    }

    pub fn clear_extra_data(&mut self) {
        self.messages.clear_extra_data();
    }

    /// Renders `template_name` inside the site wrapper as the whole response.
    pub fn render(mut self, template_name: &str) -> Result<Response, PageError> {
        self.context.insert(TEMPLATE_NAME_KEY, template_name);
        let body = self.renderer.render(WRAPPER_TEMPLATE, &self.context)?;
        Ok((self.messages.into_jar(), Html(body)).into_response())
    }

    /// Redirects to `uri`, carrying any pending cookie changes.
    pub fn redirect(self, uri: &str) -> Response {
        (self.messages.into_jar(), Redirect::to(uri)).into_response()
    }
}
