//! In-process named task queues.
//!
//! Each declared queue gets a bounded channel and a [`QueueConsumer`] that
//! drains it on its own Tokio task. Consecutive deliveries from one queue are
//! spaced by the queue's throttle interval, so the queue name doubles as a rate
//! limit for the work behind it (outbound mail, here).
//!
//! Delivery is at-least-once within one process lifetime: a failed delivery
//! is retried with exponential backoff until the queue's retry budget runs
//! out, after which the task is dropped and logged. Tasks still waiting in a
//! channel when the process exits are lost.
//!
//! ```text
//!   handler ──add──► [queue "email-throttle"] ──► consumer ──POST──► /tasks/...
//!                                                   │  throttle + backoff
//!                                                   ▼
//!                                          delivered | dropped
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::delivery::{DeliveryError, TaskDelivery};
use super::retry::RetryConfig;
use super::{QueueError, Task, TaskId, TaskQueue};

/// Channel buffer size for each queue.
const QUEUE_CHANNEL_BUFFER: usize = 100;

/// Settings for one named queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSpec {
    pub name: String,
    /// Minimum spacing between two deliveries.
    pub throttle: Duration,
    pub retry: RetryConfig,
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, throttle: Duration, retry: RetryConfig) -> Self {
        QueueSpec {
            name: name.into(),
            throttle,
            retry,
        }
    }
}

/// Final state of a task once its consumer is done with it.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The handler accepted the task.
    Delivered { attempts: u32 },
    /// Every attempt failed; the task is gone.
    Dropped {
        attempts: u32,
        last_error: DeliveryError,
    },
    /// Shutdown was requested while the task was waiting to be retried.
    Cancelled { attempts: u32 },
}

/// Sending half of every declared queue.
#[derive(Debug, Clone, Default)]
pub struct LocalTaskQueue {
    senders: HashMap<String, mpsc::Sender<Task>>,
}

impl LocalTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a queue and returns the consumer that will drain it.
    ///
    /// Declaring a name twice replaces the earlier queue; its consumer stops
    /// once the tasks already buffered have been handled.
    pub fn declare(&mut self, spec: QueueSpec) -> QueueConsumer {
        let (tx, rx) = mpsc::channel(QUEUE_CHANNEL_BUFFER);
        self.senders.insert(spec.name.clone(), tx);
        QueueConsumer { spec, rx }
    }

    /// Returns true if a queue with this name has been declared.
    pub fn has_queue(&self, name: &str) -> bool {
        self.senders.contains_key(name)
    }
}

impl TaskQueue for LocalTaskQueue {
    fn add(&self, queue_name: &str, task: Task) -> Result<TaskId, QueueError> {
        let tx = self
            .senders
            .get(queue_name)
            .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))?;

        let id = task.id().clone();
        match tx.try_send(task) {
            Ok(()) => {
                debug!(queue = %queue_name, task = %id, "Task queued");
                Ok(id)
            }
            Err(TrySendError::Full(_)) => Err(QueueError::Full(queue_name.to_string())),
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed(queue_name.to_string())),
        }
    }
}

/// Receiving half of one queue.
#[derive(Debug)]
pub struct QueueConsumer {
    spec: QueueSpec,
    rx: mpsc::Receiver<Task>,
}

impl QueueConsumer {
    /// Spawns [`run`](Self::run) on the Tokio runtime.
    pub fn spawn<D>(self, delivery: D, shutdown: CancellationToken) -> JoinHandle<()>
    where
        D: TaskDelivery + 'static,
    {
        tokio::spawn(self.run(delivery, shutdown))
    }

    /// Drains the queue until shutdown or until every sender is gone.
    pub async fn run<D: TaskDelivery>(mut self, delivery: D, shutdown: CancellationToken) {
        info!(queue = %self.spec.name, "Queue consumer started");

        loop {
            let task = tokio::select! {
                _ = shutdown.cancelled() => break,
                task = self.rx.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            };

            self.process(&delivery, task, &shutdown).await;

            if !self.spec.throttle.is_zero() {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(self.spec.throttle) => {}
                }
            }
        }

        info!(queue = %self.spec.name, "Queue consumer stopped");
    }

    /// Delivers one task, retrying failures on the queue's backoff schedule.
    #[instrument(skip_all, fields(queue = %self.spec.name, task = %task.id(), url = %task.url()))]
    pub async fn process<D: TaskDelivery>(
        &self,
        delivery: &D,
        task: Task,
        shutdown: &CancellationToken,
    ) -> TaskOutcome {
        let retry = self.spec.retry;
        let mut attempt = 0;

        loop {
            let result = delivery.deliver(&self.spec.name, &task, attempt).await;
            attempt += 1;

            let err = match result {
                Ok(()) => {
                    info!(attempts = attempt, "Task delivered");
                    return TaskOutcome::Delivered { attempts: attempt };
                }
                Err(err) => err,
            };

            if attempt >= retry.max_attempts() {
                error!(attempts = attempt, error = %err, "Task dropped after final attempt");
                return TaskOutcome::Dropped {
                    attempts: attempt,
                    last_error: err,
                };
            }

            let delay = retry.delay_for_attempt(attempt - 1);
            warn!(
                attempts = attempt,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Task delivery failed, retrying"
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(attempts = attempt, "Shutdown during retry backoff");
                    return TaskOutcome::Cancelled { attempts: attempt };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
