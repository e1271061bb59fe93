//! Task execution primitives for cloud control-plane clients.
//!
//! This crate wraps individual remote-API calls with uniform retry,
//! result-shape normalization, and synchronization semantics. Callers
//! submit work -- a dedicated task type, a named client method, or an
//! arbitrary callable -- and always observe the same completion protocol:
//! the task runs against the bound client, retries a retriable connection
//! failure exactly once, stores its result or error, and `wait` replays
//! that outcome (normalized into plain mappings, or raw) to every
//! observer.
//!
//! The baseline [`TaskManager`] is direct and synchronous: each
//! submission executes on the calling context. The same task protocol
//! works unchanged under an externally supplied concurrent manager,
//! because every task carries its own one-shot completion signal --
//! a no-op when execution is inline, a genuine blocking wait when the
//! work runs on a worker.
//!
//! # Module Organization
//!
//! - [`task`] - The [`Task`] state machine and [`TaskState`] completion signal
//! - [`manager`] - [`TaskManager`] facade and the [`TaskSubmitter`] seam
//! - [`request`] - [`RequestTask`] for wire-level responses
//! - [`factory`] - [`FnTask`] and [`WorkRef`] for ad hoc submissions
//! - [`shape`] - Result-shape classification and normalization
//! - [`client`] - Collaborator interfaces ([`CloudClient`], [`Response`])
//! - [`error`] - [`TaskError`] taxonomy and retriable classification
//! - [`constants`] - Correlation-id header and mapping-key names
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloud_tasks::{CloudClient, TaskArgs, TaskError, TaskManager, TaskSubmitter, WorkRef};
//!
//! # async fn example(client: Arc<dyn CloudClient>) -> Result<(), TaskError> {
//! let manager = TaskManager::new(client, "compute");
//!
//! // Submit a client method by name; the result comes back as plain
//! // mappings.
//! let servers = manager
//!     .submit_function(WorkRef::method("list_servers"), None, None, TaskArgs::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod factory;
pub mod manager;
pub mod request;
pub mod shape;
pub mod task;

// Re-exports for ergonomic access
pub use client::{CloudClient, Response, TaskArgs};
pub use error::TaskError;
pub use factory::{identity_filter, FnTask, ResultFilter, WorkRef};
pub use manager::{TaskManager, TaskSubmitter};
pub use request::RequestTask;
pub use task::{Task, TaskState};
