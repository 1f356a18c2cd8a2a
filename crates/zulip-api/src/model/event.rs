//! Event queue models.
//!
//! Events arrive as untagged JSON objects. [`QueueEvent::decode`] tells them
//! apart by which fields are present, in this order:
//!
//! ```text
//! result == "error"      -> QueueEvent::Error
//! no "message"           -> QueueEvent::Heartbeat
//! "message" not object   -> ShapeError::InvalidMessage
//! no numeric "id"        -> ShapeError::InvalidEventId
//! no string "content"    -> ShapeError::InvalidMessageContent
//! otherwise              -> QueueEvent::Message
//! ```

use serde_json::{Map, Value};

use zulip_core::{Params, PayloadField, ShapeError, ZulipError, ZulipResult, bool_param};

use super::message::{Message, NarrowClause};

/// Cursor value for a queue that has not acknowledged any event yet.
pub const NO_EVENT_ID: i64 = -1;

// =============================================================================
// Registration
// =============================================================================

/// Parameters for registering an event queue.
///
/// Defaults ask for the least data: every flag is off, every list empty. Empty
/// `event_types` and `fetch_event_types` mean "all categories".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    pub apply_markdown: bool,
    pub client_gravatar: bool,
    pub event_types: Vec<String>,
    pub all_public_streams: bool,
    pub include_subscribers: bool,
    pub fetch_event_types: Vec<String>,
    pub narrow: Vec<NarrowClause>,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_markdown(mut self, value: bool) -> Self {
        self.apply_markdown = value;
        self
    }

    pub fn client_gravatar(mut self, value: bool) -> Self {
        self.client_gravatar = value;
        self
    }

    pub fn event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn all_public_streams(mut self, value: bool) -> Self {
        self.all_public_streams = value;
        self
    }

    pub fn include_subscribers(mut self, value: bool) -> Self {
        self.include_subscribers = value;
        self
    }

    pub fn fetch_event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_event_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn narrow(mut self, narrow: Vec<NarrowClause>) -> Self {
        self.narrow = narrow;
        self
    }

    /// Encodes the options as request parameters.
    ///
    /// Fails before anything is sent if a list cannot be JSON-encoded.
    pub fn to_params(&self) -> ZulipResult<Params> {
        let mut params = Params::new();
        params.insert("apply_markdown".into(), bool_param(self.apply_markdown));
        params.insert("client_gravatar".into(), bool_param(self.client_gravatar));
        params.insert(
            "all_public_streams".into(),
            bool_param(self.all_public_streams),
        );
        params.insert(
            "include_subscribers".into(),
            bool_param(self.include_subscribers),
        );

        if !self.event_types.is_empty() {
            params.insert(
                "event_types".into(),
                encode(&self.event_types, PayloadField::EventTypes)?,
            );
        }
        if !self.fetch_event_types.is_empty() {
            params.insert(
                "fetch_event_types".into(),
                encode(&self.fetch_event_types, PayloadField::FetchEventTypes)?,
            );
        }
        params.insert("narrow".into(), encode(&self.narrow, PayloadField::Narrow)?);

        Ok(params)
    }
}

/// JSON-encodes a structured parameter.
pub(crate) fn encode<T: serde::Serialize + ?Sized>(
    value: &T,
    field: PayloadField,
) -> ZulipResult<String> {
    serde_json::to_string(value).map_err(|e| ZulipError::serialization(field, e))
}

/// A registered event queue.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueue {
    /// Server-side queue identifier.
    pub queue_id: String,
    /// Cursor to pass to the first poll.
    pub last_event_id: i64,
    /// Initial state returned alongside the queue (only populated when
    /// `fetch_event_types` asked for it).
    pub state: Map<String, Value>,
}

// =============================================================================
// Events
// =============================================================================

/// A decoded queue event.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// The server reported a failure inside the event stream.
    Error { message: String },
    /// A keep-alive without a message.
    Heartbeat,
    /// A message event.
    Message { id: i64, message: Message },
}

impl QueueEvent {
    /// Decodes one raw event.
    pub fn decode(event: &Value) -> ZulipResult<Self> {
        if event.get("result").and_then(Value::as_str) == Some("error") {
            let message = event
                .get("msg")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("unknown error")
                .to_string();
            return Ok(Self::Error { message });
        }

        let Some(raw) = event.get("message") else {
            return Ok(Self::Heartbeat);
        };
        let message = Message::from_value(raw)?;

        let id = event
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(ShapeError::InvalidEventId)?;

        message.content()?;

        Ok(Self::Message { id, message })
    }

    /// The event ID, for message events.
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Message { id, .. } => Some(*id),
            _ => None,
        }
    }
}
