//! HTTP server for the site.
//!
//! # Endpoints
//!
//! - `GET /`, `/resume`, `/projects` - Static pages
//! - `GET /contact` - Contact page, showing any pending flash or error once
//! - `POST /contact` - Queues a notification and redirects back with a flash
//! - `POST /tasks/email/me` - Called by the mail queue; sends the notification
//! - `GET /health` - Returns 200 if the server is running

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::config::{Config, ContactValidation, SiteConfig};
use crate::mail::Mailer;
use crate::tasks::TaskQueue;
use crate::templates::Renderer;

pub mod contact;
pub mod email_worker;
pub mod handler;
pub mod health;
pub mod pages;

pub use contact::{EMAIL_TASK_URL, contact_submit_handler};
pub use email_worker::email_me_handler;
pub use handler::{PageError, PageHandler};
pub use health::health_handler;
pub use pages::{contact_page_handler, main_handler, projects_handler, resume_handler};

/// Shared application state.
///
/// Passed to all handlers via Axum's `State` extractor. Holds only read-only
/// configuration and handles to the collaborators; nothing request-specific.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    site: SiteConfig,
    renderer: Arc<dyn Renderer>,
    queue: Arc<dyn TaskQueue>,
    mailer: Arc<dyn Mailer>,
    /// Sender and recipient of contact notifications.
    owner: String,
    /// Queue contact notifications are added to.
    queue_name: String,
    contact_validation: ContactValidation,
}

impl AppState {
    /// Creates a new `AppState` from configuration and collaborators.
    pub fn new(
        config: &Config,
        renderer: Arc<dyn Renderer>,
        queue: Arc<dyn TaskQueue>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                site: config.site.clone(),
                renderer,
                queue,
                mailer,
                owner: config.mail.owner.clone(),
                queue_name: config.queue.name.clone(),
                contact_validation: config.contact.validation,
            }),
        }
    }

    pub fn site(&self) -> &SiteConfig {
        &self.inner.site
    }

    pub fn renderer(&self) -> Arc<dyn Renderer> {
        Arc::clone(&self.inner.renderer)
    }

    pub fn queue(&self) -> &dyn TaskQueue {
        self.inner.queue.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    pub fn owner(&self) -> &str {
        &self.inner.owner
    }

    pub fn queue_name(&self) -> &str {
        &self.inner.queue_name
    }

    pub fn contact_validation(&self) -> ContactValidation {
        self.inner.contact_validation
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("site", &self.inner.site)
            .field("owner", &self.inner.owner)
            .field("queue_name", &self.inner.queue_name)
            .field("contact_validation", &self.inner.contact_validation)
            .finish_non_exhaustive()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(main_handler))
        .route("/resume", get(resume_handler))
        .route("/projects", get(projects_handler))
        .route(
            "/contact",
            get(contact_page_handler).post(contact_submit_handler),
        )
        .route(EMAIL_TASK_URL, post(email_me_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
