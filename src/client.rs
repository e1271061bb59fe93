//! Collaborator interfaces consumed by tasks.
//!
//! The crate does not own a cloud client or a transport. It consumes two
//! shapes: [`CloudClient`], a handle exposing named methods that tasks
//! invoke at execution time, and [`Response`], the raw transport response
//! produced by wire-level methods.
//!
//! Method dispatch is by name: a task constructed around a method name
//! resolves it against the bound client when it runs, so the same task
//! definition works against any client that serves that name. Clients are
//! shared read-only across submissions (`Arc<dyn CloudClient>`); making a
//! client safe for parallel dispatch is the implementor's responsibility.

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::{Map, Value};

use crate::constants::REQUEST_ID_HEADER;
use crate::error::TaskError;

/// Named-parameter mapping forwarded to a task's work function.
pub type TaskArgs = Map<String, Value>;

/// Handle to a cloud control-plane client.
///
/// Implementations map method names to their own API surface. A task
/// submitted by method name fails with whatever error the client reports
/// for an unknown name; the crate imposes no registry of its own.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Invokes the named domain method with the given arguments.
    async fn call(&self, method: &str, args: &TaskArgs) -> Result<Value, TaskError>;

    /// Invokes the named wire-level method, producing a raw transport
    /// response.
    ///
    /// The default rejects the call; clients that serve no raw endpoints
    /// need not implement it.
    async fn request(&self, method: &str, _args: &TaskArgs) -> Result<Response, TaskError> {
        Err(TaskError::other(anyhow::anyhow!(
            "client does not serve raw requests (method {method:?})"
        )))
    }
}

/// A raw transport response.
///
/// Carries the status, headers, and body text of one control-plane HTTP
/// exchange. [`json`](Response::json) may fail -- endpoints legitimately
/// return empty or non-JSON bodies -- and callers decide how to recover.
///
/// # Examples
///
/// ```
/// use cloud_tasks::client::Response;
/// use http::StatusCode;
///
/// let response = Response::new(StatusCode::OK, r#"{"servers": []}"#)
///     .with_header(
///         http::HeaderName::from_static("x-request-id"),
///         http::HeaderValue::from_static("req-123"),
///     );
/// assert_eq!(response.json().unwrap()["servers"], serde_json::json!([]));
/// assert_eq!(response.request_id().as_deref(), Some("req-123"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Creates a response with the given status and body text.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header, builder style.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// The request-correlation id from the
    /// [`x-request-id`](crate::constants::REQUEST_ID_HEADER) header, if
    /// present and valid UTF-8.
    pub fn request_id(&self) -> Option<String> {
        self.headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}
