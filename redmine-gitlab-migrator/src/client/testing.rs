//! In-memory transport for unit tests.

use super::{ClientError, Transport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub destination: Option<PathBuf>,
}

impl RecordedRequest {
    /// Returns the last value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays queued JSON responses per `(method, url)` and records requests.
///
/// Unrouted requests fail with a 404 [`ClientError::Status`].
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(&'static str, String), VecDeque<Value>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(&self, method: &'static str, url: &str, response: Value) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn on_get(&self, url: &str, response: Value) {
        self.on("GET", url, response);
    }

    pub fn on_post(&self, url: &str, response: Value) {
        self.on("POST", url, response);
    }

    pub fn on_put(&self, url: &str, response: Value) {
        self.on("PUT", url, response);
    }

    /// Queues the text written by the next download of `url`.
    pub fn on_download(&self, url: &str, contents: &str) {
        self.on("DOWNLOAD", url, Value::String(contents.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, url: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url == url)
            .collect()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        destination: Option<&Path>,
    ) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
            destination: destination.map(Path::to_path_buf),
        });

        self.routes
            .lock()
            .unwrap()
            .get_mut(&(method, url.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| ClientError::Status {
                method,
                url: url.to_string(),
                status: 404,
                body: String::new(),
            })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        self.respond("GET", url, query, None, None)
    }

    async fn post(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.respond("POST", url, query, Some(body), None)
    }

    async fn put(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.respond("PUT", url, query, Some(body), None)
    }

    async fn download(
        &self,
        url: &str,
        query: &[(String, String)],
        destination: &Path,
    ) -> Result<u64, ClientError> {
        let contents = self.respond("DOWNLOAD", url, query, None, Some(destination))?;
        let text = contents.as_str().unwrap_or_default().to_string();
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(destination, &text).unwrap();
        Ok(text.len() as u64)
    }
}

/// Builds a Redmine style listing envelope.
pub(crate) fn envelope(key: &str, items: Vec<Value>, total: u64, offset: u64, limit: u64) -> Value {
    let mut value = json!({
        "total_count": total,
        "offset": offset,
        "limit": limit,
    });
    value[key] = Value::Array(items);
    value
}
