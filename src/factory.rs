//! Ad hoc task generation.
//!
//! Not every submission deserves a dedicated task type. [`FnTask`] wraps
//! an arbitrary work reference -- a callable, or the name of a client
//! method resolved at execution time -- plus an optional result filter,
//! so a facade can offer "call this function" and "call this named method
//! on my client" submission styles with the full task protocol (retry,
//! completion signal, normalization) attached.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::client::{CloudClient, TaskArgs};
use crate::error::TaskError;
use crate::shape;
use crate::task::{Task, TaskState};

/// Filter applied to a normalized result before it is returned.
///
/// The default, [`identity_filter`], passes the result through untouched
/// and never fails.
pub type ResultFilter = Arc<dyn Fn(Value) -> Result<Value, TaskError> + Send + Sync>;

/// The default pass-through result filter.
pub fn identity_filter() -> ResultFilter {
    Arc::new(|value| Ok(value))
}

/// Boxed async callable invoked with the task's argument mapping.
pub type CallableWork =
    Box<dyn Fn(TaskArgs) -> BoxFuture<'static, Result<Value, TaskError>> + Send + Sync>;

/// A reference to the work an [`FnTask`] performs.
///
/// Either a direct callable invoked with the task's argument mapping, or
/// the name of a client method resolved at execution time through
/// [`CloudClient::call`].
pub enum WorkRef {
    /// Direct callable. The `&'static str` is the callable's type name,
    /// used as the default display name.
    Callable(&'static str, CallableWork),
    /// Client method resolved by name when the task runs.
    Method(String),
}

impl WorkRef {
    /// Wraps an async callable taking the task's argument mapping.
    pub fn callable<F, Fut>(f: F) -> Self
    where
        F: Fn(TaskArgs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value, TaskError>> + Send + 'static,
    {
        Self::Callable(
            std::any::type_name::<F>(),
            Box::new(move |args| Box::pin(f(args))),
        )
    }

    /// References a client method by name.
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }

    fn default_name(&self) -> &str {
        match self {
            Self::Callable(type_name, _) => type_name,
            Self::Method(name) => name,
        }
    }
}

impl std::fmt::Debug for WorkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callable(type_name, _) => f.debug_tuple("Callable").field(type_name).finish(),
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
        }
    }
}

/// An anonymous task around an arbitrary work reference.
///
/// Display name defaults to the callable's type name or the literal
/// method-name string. Unless raw mode bypasses it, the result filter
/// applies after standard shape normalization.
///
/// # Examples
///
/// ```
/// use cloud_tasks::{FnTask, WorkRef};
/// use serde_json::json;
///
/// let task = FnTask::new(
///     WorkRef::callable(|_args| async { Ok(json!([1, 2])) }),
///     Some("list_ids"),
///     Default::default(),
/// );
/// ```
pub struct FnTask {
    name: String,
    args: TaskArgs,
    work: WorkRef,
    filter: ResultFilter,
    state: TaskState,
}

impl FnTask {
    /// Creates a task around `work`, with `name` falling back to the work
    /// reference's own name.
    pub fn new(work: WorkRef, name: Option<&str>, args: TaskArgs) -> Self {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| work.default_name().to_string());
        Self {
            name,
            args,
            work,
            filter: identity_filter(),
            state: TaskState::new(),
        }
    }

    /// Creates a task around a direct callable.
    pub fn from_callable<F, Fut>(name: Option<&str>, f: F, args: TaskArgs) -> Self
    where
        F: Fn(TaskArgs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value, TaskError>> + Send + 'static,
    {
        Self::new(WorkRef::callable(f), name, args)
    }

    /// Creates a task around a named client method.
    pub fn from_method(name: Option<&str>, method: impl Into<String>, args: TaskArgs) -> Self {
        Self::new(WorkRef::method(method), name, args)
    }

    /// Replaces the identity filter.
    pub fn with_filter(mut self, filter: ResultFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &TaskState {
        &self.state
    }

    async fn main(&self, client: &dyn CloudClient) -> Result<Value, TaskError> {
        match &self.work {
            WorkRef::Callable(_, work) => work(self.args.clone()).await,
            WorkRef::Method(method) => client.call(method, &self.args).await,
        }
    }

    fn normalize(&self, result: &Value) -> Result<Value, TaskError> {
        (self.filter)(shape::normalize(result, self.state.request_id()))
    }
}
