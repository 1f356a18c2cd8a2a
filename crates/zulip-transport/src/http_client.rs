//! HTTP client implementation backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde_json::Value;
use tracing::{debug, trace};

use zulip_core::{Credentials, HttpClient, Method, Params, TransportError, TransportResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpClient`] that sends real requests with basic authentication.
///
/// `GET`/`DELETE` parameters go into the query string, `POST`/`PATCH`
/// parameters into a form-encoded body.
#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Creates a client with [`DEFAULT_TIMEOUT`].
    pub fn new() -> TransportResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("zulip-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn build(&self, method: Method, url: &str, params: &Params) -> RequestBuilder {
        let req = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };

        if method.uses_query() {
            req.query(params)
        } else {
            req.form(params)
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: Params,
        credentials: &Credentials,
    ) -> TransportResult<Value> {
        debug!(method = %method, url = %url, "Sending API request");

        let resp = self
            .build(method, url, &params)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        trace!(status = status, body = %text, "API response");
        decode_body(status, &text)
    }
}

/// Decodes a response body.
///
/// Any JSON body is returned as-is, including error statuses, so that the
/// server's `msg` reaches the caller. Non-JSON error bodies become
/// [`TransportError::Status`].
fn decode_body(status: u16, text: &str) -> TransportResult<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Err(TransportError::Status {
            status,
            body: text.to_string(),
        }),
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}
