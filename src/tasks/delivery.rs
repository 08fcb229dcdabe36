//! Task delivery.
//!
//! A queue consumer hands each task to a [`TaskDelivery`]. In production that
//! is [`RouterDelivery`], which POSTs the task to its URL on the application's
//! own router, the same way a browser request would arrive.

use std::future::Future;

use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use thiserror::Error;
use tower::ServiceExt;

use super::Task;

/// Header carrying the name of the queue a task came from.
pub const QUEUE_NAME_HEADER: &str = "x-task-queue-name";
/// Header carrying the task's unique name.
pub const TASK_NAME_HEADER: &str = "x-task-name";
/// Header carrying how many earlier deliveries of this task failed.
pub const RETRY_COUNT_HEADER: &str = "x-task-retry-count";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors that can occur while delivering a task.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The task could not be turned into a request (e.g. a malformed URL).
    #[error("invalid task request: {0}")]
    InvalidRequest(String),

    /// The handler answered with a non-success status.
    #[error("task handler returned {0}")]
    Status(StatusCode),

    /// Any other failure reported by a delivery implementation.
    #[error("{0}")]
    Other(String),
}

/// Delivers one task to whatever performs it.
pub trait TaskDelivery: Send + Sync {
    /// Delivers `task` from `queue_name`. `retry_count` is the number of
    /// earlier failed deliveries of the same task.
    fn deliver(
        &self,
        queue_name: &str,
        task: &Task,
        retry_count: u32,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Delivers tasks by calling the application router in-process.
#[derive(Clone)]
pub struct RouterDelivery {
    router: Router,
}

impl RouterDelivery {
    pub fn new(router: Router) -> Self {
        RouterDelivery { router }
    }
}

impl std::fmt::Debug for RouterDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterDelivery").finish_non_exhaustive()
    }
}

impl TaskDelivery for RouterDelivery {
    fn deliver(
        &self,
        queue_name: &str,
        task: &Task,
        retry_count: u32,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        let router = self.router.clone();
        let request = build_request(queue_name, task, retry_count);

        async move {
            let request = request?;
            let response = match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(DeliveryError::Status(status))
            }
        }
    }
}

/// Builds the form POST a task is delivered as.
pub fn build_request(
    queue_name: &str,
    task: &Task,
    retry_count: u32,
) -> Result<Request<Body>, DeliveryError> {
    Request::builder()
        .method(Method::POST)
        .uri(task.url())
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .header(QUEUE_NAME_HEADER, queue_name)
        .header(TASK_NAME_HEADER, task.id().as_str())
        .header(RETRY_COUNT_HEADER, retry_count.to_string())
        .body(Body::from(task.form_body()))
        .map_err(|e| DeliveryError::InvalidRequest(e.to_string()))
}
