//! Background tasks.
//!
//! Work that should not hold up a browser request is described as a [`Task`]
//! (a target URL plus string parameters) and added to a named queue through
//! the [`TaskQueue`] trait. The queue later delivers the task as a form POST
//! to its URL, so the code that performs the work is an ordinary HTTP handler.
//!
//! # Module Structure
//!
//! - [`queue`]: in-process named queues with throttled, retried delivery
//! - [`delivery`]: how a queued task reaches its handler
//! - [`retry`]: backoff schedule for redelivery

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod delivery;
pub mod queue;
pub mod retry;

pub use delivery::{DeliveryError, RouterDelivery, TaskDelivery};
pub use queue::{LocalTaskQueue, QueueConsumer, QueueSpec, TaskOutcome};
pub use retry::RetryConfig;

/// Unique name assigned to a task when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> Self {
        TaskId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of deferred work: POST `params` to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    url: String,
    params: BTreeMap<String, String>,
}

impl Task {
    /// Creates a task targeting `url` with no parameters.
    pub fn new(url: impl Into<String>) -> Self {
        Task {
            id: TaskId::generate(),
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any previous value for `key`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Encodes the parameters as an `application/x-www-form-urlencoded` body.
    pub fn form_body(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Errors that can occur when adding a task to a queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// No queue with this name has been declared.
    #[error("unknown queue: {0}")]
    UnknownQueue(String),

    /// The queue's buffer is full.
    #[error("queue {0} is full")]
    Full(String),

    /// The queue's consumer has stopped.
    #[error("queue {0} is closed")]
    Closed(String),
}

/// Accepts tasks for later delivery.
///
/// Adding a task never waits for it to run; delivery guarantees (ordering,
/// throttling, redelivery) belong to the implementation.
pub trait TaskQueue: Send + Sync {
    /// Adds `task` to the queue called `queue_name`.
    fn add(&self, queue_name: &str, task: Task) -> Result<TaskId, QueueError>;
}
