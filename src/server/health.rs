//! `GET /health` for uptime checks against the site.

use axum::http::StatusCode;

/// Answers `200 OK` whenever the site is serving requests. It does not touch
/// the renderer, the mail queue or the mailer.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
