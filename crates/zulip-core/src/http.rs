//! The HTTP contract consumed by the resource clients.
//!
//! Resource clients never talk to the network themselves. They build a flat
//! string map of parameters and hand it to an [`HttpClient`], which performs an
//! authenticated request and returns the decoded JSON body.
//!
//! | Method | Parameter placement |
//! |--------|---------------------|
//! | `GET`, `DELETE` | query string |
//! | `POST`, `PATCH` | `application/x-www-form-urlencoded` body |
//!
//! Nested values (lists of event types, narrows, ...) are JSON-encoded by the
//! caller before they are placed in [`Params`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportResult;

/// Flat request parameters.
pub type Params = BTreeMap<String, String>;

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in the query string rather than the body.
    pub fn uses_query(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The account email.
    pub username: String,
    /// The account API key.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Performs authenticated requests and decodes JSON responses.
///
/// Implementations must return the decoded body for every response whose body
/// is JSON, regardless of the HTTP status: the server reports domain failures
/// as `{"result": "error", "msg": ...}` with a 4xx status, and the resource
/// clients need that message.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends one request.
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: Params,
        credentials: &Credentials,
    ) -> TransportResult<Value>;
}

/// A shared HTTP client.
pub type BoxedHttpClient = Arc<dyn HttpClient>;

/// Encodes a boolean the way the API expects it.
pub fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_param() {
        assert_eq!(bool_param(true), "true");
        assert_eq!(bool_param(false), "false");
    }

    #[test]
    fn test_query_placement() {
        assert!(Method::Get.uses_query());
        assert!(Method::Delete.uses_query());
        assert!(!Method::Post.uses_query());
        assert!(!Method::Patch.uses_query());
    }
}
