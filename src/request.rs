//! Wire-level request tasks.
//!
//! [`RequestTask`] specializes the task protocol for methods that return a
//! raw transport [`Response`] instead of a domain value. Completion parses
//! the body as JSON, optionally narrows it to a configured `result_key`,
//! and records the request-correlation id from the response headers so
//! normalization can thread it into every produced mapping.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::{CloudClient, Response, TaskArgs};
use crate::error::TaskError;
use crate::task::{Task, TaskState};

/// A task around a wire-level client method.
///
/// The method name doubles as the task's display name and is resolved
/// against the bound client's [`request`](CloudClient::request) at
/// execution time.
///
/// # Examples
///
/// ```
/// use cloud_tasks::RequestTask;
///
/// let task = RequestTask::new("servers_get", Default::default())
///     .with_result_key("servers");
/// ```
#[derive(Debug)]
pub struct RequestTask {
    name: String,
    args: TaskArgs,
    result_key: Option<String>,
    state: TaskState,
}

impl RequestTask {
    /// Creates a task invoking the named wire-level method.
    pub fn new(method: impl Into<String>, args: TaskArgs) -> Self {
        Self {
            name: method.into(),
            args,
            result_key: None,
            state: TaskState::new(),
        }
    }

    /// Narrows the parsed body to the given key.
    ///
    /// The key is assumed to exist; a body without it fails with
    /// [`TaskError::MissingResultKey`].
    pub fn with_result_key(mut self, key: impl Into<String>) -> Self {
        self.result_key = Some(key.into());
        self
    }

    /// Derives the stored result from a raw response.
    ///
    /// A body that fails to parse as JSON falls back to its raw text --
    /// endpoints legitimately return empty or non-JSON bodies (204s, say),
    /// so the decode failure is logged at debug level and never
    /// propagated. The correlation id, when present, is recorded on the
    /// task state.
    pub fn complete(&self, response: &Response) -> Result<Value, TaskError> {
        let body = match response.json() {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(task = %self.name, error = %err, "could not decode json in response");
                debug!(body = response.text());
                Value::String(response.text().to_string())
            }
        };

        if let Some(id) = response.request_id() {
            self.state.record_request_id(id);
        }

        match &self.result_key {
            Some(key) => body
                .get(key)
                .cloned()
                .ok_or_else(|| TaskError::MissingResultKey { key: key.clone() }),
            None => Ok(body),
        }
    }
}

#[async_trait]
impl Task for RequestTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &TaskState {
        &self.state
    }

    async fn main(&self, client: &dyn CloudClient) -> Result<Value, TaskError> {
        let response = client.request(&self.name, &self.args).await?;
        self.complete(&response)
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderName, HeaderValue, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::constants::REQUEST_ID_HEADER;

    fn response(body: &str) -> Response {
        Response::new(StatusCode::OK, body)
    }

    #[test]
    fn complete_parses_json_body() {
        let task = RequestTask::new("servers_get", TaskArgs::new());
        let result = task.complete(&response(r#"{"servers": [{"id": 1}]}"#));
        assert_eq!(result.expect("parsed"), json!({"servers": [{"id": 1}]}));
    }

    #[test]
    fn invalid_json_falls_back_to_raw_text() {
        let task = RequestTask::new("console_get", TaskArgs::new());
        let result = task.complete(&response("not json at all"));
        assert_eq!(result.expect("text fallback"), json!("not json at all"));
    }

    #[test]
    fn empty_body_falls_back_to_empty_text() {
        let task = RequestTask::new("server_delete", TaskArgs::new());
        let result = task.complete(&Response::new(StatusCode::NO_CONTENT, ""));
        assert_eq!(result.expect("text fallback"), json!(""));
    }

    #[test]
    fn result_key_narrows_the_body() {
        let task = RequestTask::new("servers_get", TaskArgs::new()).with_result_key("servers");
        let result = task.complete(&response(r#"{"servers": [{"id": 1}, {"id": 2}]}"#));
        assert_eq!(result.expect("narrowed"), json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn missing_result_key_is_a_lookup_failure() {
        let task = RequestTask::new("servers_get", TaskArgs::new()).with_result_key("servers");
        let err = task
            .complete(&response(r#"{"flavors": []}"#))
            .expect_err("missing key");
        assert!(matches!(err, TaskError::MissingResultKey { key } if key == "servers"));
    }

    #[test]
    fn correlation_id_recorded_from_header() {
        let task = RequestTask::new("servers_get", TaskArgs::new());
        let response = response(r#"{"id": 1}"#).with_header(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_static("req-77"),
        );
        task.complete(&response).expect("ok");
        assert_eq!(task.state().request_id(), Some("req-77"));
    }

    #[tokio::test]
    async fn finished_request_task_threads_id_into_mappings() {
        struct WireClient;

        #[async_trait]
        impl CloudClient for WireClient {
            async fn call(&self, _method: &str, _args: &TaskArgs) -> Result<Value, TaskError> {
                unreachable!("request tasks go through request()");
            }

            async fn request(
                &self,
                _method: &str,
                _args: &TaskArgs,
            ) -> Result<Response, TaskError> {
                Ok(
                    Response::new(StatusCode::OK, r#"{"servers": [{"id": 1}]}"#).with_header(
                        HeaderName::from_static(REQUEST_ID_HEADER),
                        HeaderValue::from_static("req-1"),
                    ),
                )
            }
        }

        let task = RequestTask::new("servers_get", TaskArgs::new()).with_result_key("servers");
        task.run(&WireClient).await;

        let out = task.wait(false).await.expect("ok");
        assert_eq!(out, json!([{"id": 1, "request_id": "req-1"}]));

        let raw = task.wait(true).await.expect("ok");
        assert_eq!(raw, json!([{"id": 1}]));
    }
}
