//! Error types for task execution.
//!
//! Provides [`TaskError`], the failure taxonomy for submitted work. The
//! enum is `Clone` (non-clonable sources are held behind `Arc`) so a
//! failure stored on a finished task can be replayed identically to every
//! caller of `wait`, however many times it is observed and from whatever
//! context it is observed.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while executing a task.
///
/// [`RetriableConnection`](TaskError::RetriableConnection) is the one
/// designated transient kind: it triggers exactly one silent re-execution
/// of the task's work function. Every other variant is terminal on first
/// occurrence.
///
/// Arbitrary collaborator failures travel in
/// [`Other`](TaskError::Other) as an `Arc<anyhow::Error>`, preserving the
/// original error's type, message, and context chain across the
/// run/wait boundary.
///
/// # Examples
///
/// ```
/// use cloud_tasks::TaskError;
///
/// let err = TaskError::retriable("connection reset by peer");
/// assert!(err.is_retriable());
/// assert!(err.to_string().contains("connection reset by peer"));
///
/// let err = TaskError::other(std::io::Error::other("boom"));
/// assert!(!err.is_retriable());
/// ```
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// Transient connection failure eligible for a single automatic retry.
    #[error("retriable connection failure: {message}")]
    RetriableConnection {
        /// Description of the underlying transport failure.
        message: String,
    },

    /// A configured `result_key` was absent from the parsed response body.
    ///
    /// Narrowing assumes the key exists; its absence is a defect in the
    /// caller's expectations and propagates like any other failure.
    #[error("result key {key:?} missing from response body")]
    MissingResultKey {
        /// The key that was requested.
        key: String,
    },

    /// A result filter rejected the (normalized) result.
    #[error("result filter rejected result: {message}")]
    Filter {
        /// Reason reported by the filter.
        message: String,
    },

    /// Any other failure, with its original context chain intact.
    #[error("{0}")]
    Other(Arc<anyhow::Error>),
}

impl TaskError {
    /// Builds the designated retriable transport failure.
    pub fn retriable(message: impl Into<String>) -> Self {
        Self::RetriableConnection {
            message: message.into(),
        }
    }

    /// Builds a filter rejection.
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error, preserving its chain.
    pub fn other(err: impl Into<anyhow::Error>) -> Self {
        Self::Other(Arc::new(err.into()))
    }

    /// Returns `true` only for the designated retriable connection kind.
    ///
    /// `Task::run` consults this to decide whether the single built-in
    /// retry applies.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::RetriableConnection { .. })
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_failures_are_retriable() {
        assert!(TaskError::retriable("timed out").is_retriable());
        assert!(!TaskError::MissingResultKey {
            key: "servers".to_string()
        }
        .is_retriable());
        assert!(!TaskError::filter("bad shape").is_retriable());
        assert!(!TaskError::other(std::io::Error::other("boom")).is_retriable());
    }

    #[test]
    fn display_messages() {
        let err = TaskError::retriable("connection reset");
        assert_eq!(
            err.to_string(),
            "retriable connection failure: connection reset"
        );

        let err = TaskError::MissingResultKey {
            key: "servers".to_string(),
        };
        assert_eq!(err.to_string(), "result key \"servers\" missing from response body");
    }

    #[test]
    fn other_preserves_context_chain() {
        let inner = anyhow::anyhow!("socket closed").context("listing servers");
        let err = TaskError::other(inner);
        assert_eq!(err.to_string(), "listing servers");

        // Clones share the same underlying chain.
        let clone = err.clone();
        if let (TaskError::Other(a), TaskError::Other(b)) = (&err, &clone) {
            assert!(Arc::ptr_eq(a, b));
            assert_eq!(format!("{:#}", a), "listing servers: socket closed");
        } else {
            panic!("expected Other variants");
        }
    }
}
