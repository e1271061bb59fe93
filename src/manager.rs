//! The task submission facade.
//!
//! [`TaskManager`] binds a client handle and executes submitted tasks
//! directly on the calling context: `submit_task` runs the task, waits,
//! and returns its normalized (or raw) outcome. The [`TaskSubmitter`]
//! trait is the pluggable seam -- a concurrent manager that owns a worker
//! loop implements the same trait (using [`run`](TaskSubmitter::run) and
//! [`stop`](TaskSubmitter::stop) to bracket the loop's lifetime) without
//! changing the call contract callers see.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::{CloudClient, TaskArgs};
use crate::error::TaskError;
use crate::factory::{identity_filter, FnTask, ResultFilter, WorkRef};
use crate::task::Task;

/// Submission contract shared by direct and concurrent managers.
///
/// The contract promises only that [`submit_task`](Self::submit_task)
/// returns the finished task's normalized result or propagates its error;
/// where the task's work executes is the implementation's business.
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Executes `task` against the bound client and waits for its outcome.
    async fn submit_task(&self, task: &dyn Task, raw: bool) -> Result<Value, TaskError>;

    /// Starts the manager's worker loop, if it has one.
    async fn run(&self) {}

    /// Stops the manager's worker loop, if it has one.
    async fn stop(&self) {}
}

/// Direct, synchronous task manager.
///
/// Stateless across submissions except for the bound client reference and
/// the default result filter. Each submission executes on the calling
/// context and returns only once the task has finished.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cloud_tasks::{CloudClient, TaskArgs, TaskError, TaskManager, TaskSubmitter, WorkRef};
/// use serde_json::Value;
///
/// # async fn example(client: Arc<dyn CloudClient>) -> Result<(), TaskError> {
/// let manager = TaskManager::new(client, "compute");
/// let servers = manager
///     .submit_function(WorkRef::method("list_servers"), None, None, TaskArgs::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct TaskManager {
    name: String,
    client: Arc<dyn CloudClient>,
    filter: ResultFilter,
}

impl TaskManager {
    /// Creates a manager bound to `client`.
    pub fn new(client: Arc<dyn CloudClient>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            filter: identity_filter(),
        }
    }

    /// Replaces the default (identity) result filter used by
    /// [`submit_function`](Self::submit_function).
    pub fn with_filter(mut self, filter: ResultFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The manager's display name, as used in log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submits an arbitrary work reference.
    ///
    /// Builds an [`FnTask`] around `work` -- the manager's default filter
    /// applies when none is supplied -- and delegates to
    /// [`submit_task`](TaskSubmitter::submit_task) in normalized mode.
    pub async fn submit_function(
        &self,
        work: WorkRef,
        name: Option<&str>,
        filter: Option<ResultFilter>,
        args: TaskArgs,
    ) -> Result<Value, TaskError> {
        let filter = filter.unwrap_or_else(|| Arc::clone(&self.filter));
        let task = FnTask::new(work, name, args).with_filter(filter);
        self.submit_task(&task, false).await
    }
}

#[async_trait]
impl TaskSubmitter for TaskManager {
    async fn submit_task(&self, task: &dyn Task, raw: bool) -> Result<Value, TaskError> {
        debug!(manager = %self.name, task = task.name(), "running task");
        let start = Instant::now();
        task.run(self.client.as_ref()).await;
        debug!(
            manager = %self.name,
            task = task.name(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ran task"
        );
        task.wait(raw).await
    }
}
