//! In-memory [`HttpClient`] for tests.
//!
//! Replies are keyed on `(method, path)`, where `path` is the URL with the API
//! base stripped (e.g. `"events"` or `"messages/42"`). Each route holds a queue
//! of replies; the last queued reply is sticky and is reused once the queue
//! would otherwise run dry.
//!
//! ```rust,ignore
//! let http = MockHttpClient::new("https://chat.example.com/api/v1");
//! http.reply(Method::Get, "users/me", json!({"result": "success", "full_name": "Echo"}));
//! let zulip = Zulip::new(config, http.clone());
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use crate::error::{TransportError, TransportResult};
use crate::http::{Credentials, HttpClient, Method, Params};

/// A request observed by [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub credentials: Credentials,
}

type Reply = TransportResult<Value>;

/// Scripted HTTP client.
pub struct MockHttpClient {
    base_url: String,
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    /// Creates a mock serving URLs under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queues a JSON reply for a route.
    pub fn reply(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Ok(body));
    }

    /// Queues a transport failure for a route.
    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Returns the requests received for one route.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn relative_path<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(self.base_url.as_str())
            .unwrap_or(url)
            .trim_start_matches('/')
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: Params,
        credentials: &Credentials,
    ) -> TransportResult<Value> {
        let path = self.relative_path(url).to_string();
        trace!(method = %method, path = %path, "Mock request");

        self.requests.lock().push(RecordedRequest {
            method,
            path: path.clone(),
            params,
            credentials: credentials.clone(),
        });

        let mut routes = self.routes.lock();
        let reply = routes
            .get_mut(&(method, path.clone()))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });

        reply.unwrap_or_else(|| {
            Err(TransportError::Status {
                status: 404,
                body: format!("no mock reply for {method} {path}"),
            })
        })
    }
}
