//! Static page handlers.
//!
//! Each page is a GET that renders one template inside the site wrapper. The
//! contact page also shows any pending flash or error message, once.

use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::AppState;
use super::handler::{PageError, PageHandler};

pub const MAIN_TEMPLATE: &str = "main.html";
pub const RESUME_TEMPLATE: &str = "resume.html";
pub const PROJECTS_TEMPLATE: &str = "projects.html";
pub const CONTACT_TEMPLATE: &str = "contact.html";

/// `GET /`
pub async fn main_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    PageHandler::new(&state, jar).render(MAIN_TEMPLATE)
}

/// `GET /resume`
pub async fn resume_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    PageHandler::new(&state, jar).render(RESUME_TEMPLATE)
}

/// `GET /projects`
pub async fn projects_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    PageHandler::new(&state, jar).render(PROJECTS_TEMPLATE)
}

/// `GET /contact`
pub async fn contact_page_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let mut handler = PageHandler::new(&state, jar);
    handler.maybe_show_flash();
    handler.render(CONTACT_TEMPLATE)
}
