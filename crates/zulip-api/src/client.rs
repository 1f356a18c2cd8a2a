//! Shared request plumbing and the [`Zulip`] entry point.

use std::sync::Arc;

use tracing::{debug, trace};

use zulip_core::{ApiResponse, BoxedHttpClient, Config, Method, Params, ZulipResult};

use crate::events::Events;
use crate::messages::Messages;
use crate::streams::Streams;
use crate::users::Users;

/// Sends requests for one account.
///
/// Cheap to clone: the configuration and the HTTP client are shared.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<Config>,
    http: BoxedHttpClient,
}

impl ApiClient {
    pub fn new(config: Config, http: BoxedHttpClient) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    /// The account configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sends a request to `path` (relative to the API base URL).
    pub async fn call(&self, method: Method, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        let url = self.config.endpoint(path);
        debug!(method = %method, endpoint = %path, "Calling API");

        let body = self
            .http
            .request(method, &url, params, &self.config.credentials())
            .await?;

        trace!(endpoint = %path, response = %body, "API response");
        Ok(ApiResponse::new(body))
    }

    pub async fn get(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.call(Method::Get, path, params).await
    }

    pub async fn post(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.call(Method::Post, path, params).await
    }

    pub async fn patch(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.call(Method::Patch, path, params).await
    }

    pub async fn delete(&self, path: &str, params: Params) -> ZulipResult<ApiResponse> {
        self.call(Method::Delete, path, params).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Entry point to the API of one realm account.
///
/// ```rust,ignore
/// let zulip = Zulip::new(config, Arc::new(ReqwestClient::new()?));
/// let id = zulip
///     .messages()
///     .send(MessageType::Stream, "general", Some("greetings"), "hello")
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Zulip {
    api: ApiClient,
}

impl Zulip {
    pub fn new(config: Config, http: BoxedHttpClient) -> Self {
        Self {
            api: ApiClient::new(config, http),
        }
    }

    pub fn config(&self) -> &Config {
        self.api.config()
    }

    /// The underlying request client, for endpoints without a wrapper.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn messages(&self) -> Messages {
        Messages::new(self.api.clone())
    }

    pub fn streams(&self) -> Streams {
        Streams::new(self.api.clone())
    }

    pub fn users(&self) -> Users {
        Users::new(self.api.clone())
    }

    pub fn events(&self) -> Events {
        Events::new(self.api.clone())
    }
}
