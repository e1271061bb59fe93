//! The task state machine and completion protocol.
//!
//! A [`Task`] encapsulates one unit of remote work. Its lifecycle is
//! `pending -> finished-ok | finished-error`, driven by
//! [`run`](Task::run) and observed through [`wait`](Task::wait). The
//! completion signal on [`TaskState`] is the only concurrency primitive
//! the crate guarantees: the producer writes the outcome exactly once,
//! strictly before signaling, and any number of waiters then observe the
//! same outcome -- repeatedly, and from any context.
//!
//! In the direct synchronous path the signal is already set by the time
//! `wait` is reached, so waiting is a no-op. A concurrent manager can
//! hand the task to a worker and have the original caller block on the
//! same signal without polling.

use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::TaskError;
use crate::shape;

/// Completion state shared between a task's producer and its waiters.
///
/// The outcome cell is write-once: the first call to
/// [`done`](TaskState::done) or [`fail`](TaskState::fail) wins and flips
/// the finished signal; later calls are ignored. There is no transition
/// out of a terminal state.
#[derive(Debug)]
pub struct TaskState {
    outcome: OnceLock<Result<Value, TaskError>>,
    finished: watch::Sender<bool>,
    request_id: OnceLock<String>,
}

impl TaskState {
    /// Creates a pending state.
    pub fn new() -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            outcome: OnceLock::new(),
            finished,
            request_id: OnceLock::new(),
        }
    }

    /// Stores a successful result and signals completion.
    pub fn done(&self, result: Value) {
        self.complete(Ok(result));
    }

    /// Stores a failure and signals completion.
    pub fn fail(&self, error: TaskError) {
        self.complete(Err(error));
    }

    fn complete(&self, outcome: Result<Value, TaskError>) {
        if self.outcome.set(outcome).is_ok() {
            // Outcome is visible before the signal fires.
            self.finished.send_replace(true);
        }
    }

    /// Records the request-correlation id for this task.
    ///
    /// Write-once, like the outcome; only the first id sticks.
    pub fn record_request_id(&self, id: String) {
        let _ = self.request_id.set(id);
    }

    /// The recorded correlation id, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.get().map(String::as_str)
    }

    /// Returns `true` once the task has finished.
    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Blocks until the completion signal fires.
    ///
    /// Already-finished states return immediately. Safe to call from any
    /// number of concurrent observers.
    pub async fn wait_finished(&self) {
        let mut rx = self.finished.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|finished| *finished).await;
    }

    /// The stored outcome, once finished.
    pub fn outcome(&self) -> Option<&Result<Value, TaskError>> {
        self.outcome.get()
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

/// One unit of remote work with its own completion state.
///
/// Implementations supply the workload ([`main`](Task::main)) and the
/// shared [`TaskState`]; the execution protocol ([`run`](Task::run)) and
/// the observation protocol ([`wait`](Task::wait)) are provided. Variants
/// customize how the stored result is presented by overriding
/// [`normalize`](Task::normalize).
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use cloud_tasks::{CloudClient, Task, TaskError, TaskState};
/// use serde_json::Value;
///
/// struct ListFlavors {
///     state: TaskState,
/// }
///
/// #[async_trait]
/// impl Task for ListFlavors {
///     fn name(&self) -> &str {
///         "list_flavors"
///     }
///
///     fn state(&self) -> &TaskState {
///         &self.state
///     }
///
///     async fn main(&self, client: &dyn CloudClient) -> Result<Value, TaskError> {
///         client.call("list_flavors", &Default::default()).await
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync {
    /// Display name used in log lines.
    fn name(&self) -> &str;

    /// The task's completion state.
    fn state(&self) -> &TaskState;

    /// The actual workload.
    ///
    /// Runs at most twice per [`run`](Task::run): once, plus one retry if
    /// the first failure is the designated retriable connection kind.
    async fn main(&self, client: &dyn CloudClient) -> Result<Value, TaskError>;

    /// Presentation of the stored result when `wait` is not in raw mode.
    ///
    /// The default applies shape-based normalization, threading the
    /// recorded correlation id into each produced mapping.
    fn normalize(&self, result: &Value) -> Result<Value, TaskError> {
        Ok(shape::normalize(result, self.state().request_id()))
    }

    /// Executes the workload against `client` and stores the outcome.
    ///
    /// A retriable connection failure on the first execution is logged
    /// and retried exactly once; a second occurrence, or any other
    /// failure, terminates the task with that error. There is no backoff
    /// and no unbounded retry loop.
    async fn run(&self, client: &dyn CloudClient) {
        let outcome = match self.main(client).await {
            Err(err) if err.is_retriable() => {
                debug!(task = self.name(), "connection failure, retrying");
                self.main(client).await
            }
            first => first,
        };
        match outcome {
            Ok(result) => self.state().done(result),
            Err(err) => self.state().fail(err),
        }
    }

    /// Blocks until the task finishes, then replays its outcome.
    ///
    /// A failure is re-raised to every caller with its original context
    /// chain; repeated calls reproduce the identical outcome. On success,
    /// `raw` returns the stored result unmodified, otherwise
    /// [`normalize`](Task::normalize) applies.
    async fn wait(&self, raw: bool) -> Result<Value, TaskError> {
        self.state().wait_finished().await;

        match self.state().outcome() {
            Some(Ok(result)) => {
                if raw {
                    Ok(result.clone())
                } else {
                    self.normalize(result)
                }
            }
            Some(Err(err)) => Err(err.clone()),
            // The outcome is written strictly before the signal fires.
            None => Err(TaskError::other(anyhow::anyhow!(
                "task {} signaled completion without an outcome",
                self.name()
            ))),
        }
    }
}
