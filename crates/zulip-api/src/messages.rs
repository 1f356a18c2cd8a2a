//! Sending, fetching, rendering and editing messages.

use serde_json::Value;

use zulip_core::{Params, PayloadField, ShapeError, ZulipResult};

use crate::client::ApiClient;
use crate::model::{MessageType, NarrowClause, encode};

/// Client for the `messages` resource.
#[derive(Debug, Clone)]
pub struct Messages {
    api: ApiClient,
}

impl Messages {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sends a message and returns its ID.
    ///
    /// `to` is a stream name for stream messages, or a comma-separated list of
    /// emails for private messages. `subject` is only sent when given.
    pub async fn send(
        &self,
        message_type: MessageType,
        to: &str,
        subject: Option<&str>,
        content: &str,
    ) -> ZulipResult<i64> {
        let mut params = Params::new();
        params.insert("type".into(), message_type.as_str().into());
        params.insert("to".into(), to.into());
        if let Some(subject) = subject {
            params.insert("subject".into(), subject.into());
        }
        params.insert("content".into(), content.into());

        let response = self.api.post("messages", params).await?;
        response.i64_field("id", ShapeError::MissingField("id"))
    }

    /// Fetches messages around `anchor`.
    pub async fn get(
        &self,
        narrow: &[NarrowClause],
        anchor: i64,
        num_before: u32,
        num_after: u32,
    ) -> ZulipResult<Vec<Value>> {
        let mut params = Params::new();
        params.insert("narrow".into(), encode(narrow, PayloadField::Narrow)?);
        params.insert("anchor".into(), anchor.to_string());
        params.insert("num_before".into(), num_before.to_string());
        params.insert("num_after".into(), num_after.to_string());

        let response = self.api.get("messages", params).await?;
        response.decode("messages", "a list of messages")
    }

    /// Renders Markdown to HTML the way the server would.
    pub async fn render(&self, content: &str) -> ZulipResult<String> {
        let mut params = Params::new();
        params.insert("content".into(), content.into());

        let response = self.api.post("messages/render", params).await?;
        response
            .str_field("rendered", ShapeError::MissingField("rendered"))
            .map(str::to_string)
    }

    /// Replaces the content of a message.
    pub async fn update(&self, message_id: i64, content: &str) -> ZulipResult<()> {
        let mut params = Params::new();
        params.insert("content".into(), content.into());

        self.api
            .patch(&format!("messages/{message_id}"), params)
            .await?
            .check()
            .map(drop)
    }
}
