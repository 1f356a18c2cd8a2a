//! Message models.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use zulip_core::ShapeError;

/// Whether a message goes to a stream or to individual users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Stream,
    Private,
}

impl MessageType {
    /// Returns the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `[operator, operand]` clause of a narrow.
///
/// Serializes as a two-element JSON array, e.g. `["stream", "general"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrowClause(pub String, pub String);

impl NarrowClause {
    pub fn new(operator: impl Into<String>, operand: impl Into<String>) -> Self {
        Self(operator.into(), operand.into())
    }

    /// Restricts to one stream.
    pub fn stream(name: impl Into<String>) -> Self {
        Self::new("stream", name)
    }

    /// Restricts to one topic.
    pub fn topic(name: impl Into<String>) -> Self {
        Self::new("topic", name)
    }

    pub fn operator(&self) -> &str {
        &self.0
    }

    pub fn operand(&self) -> &str {
        &self.1
    }
}

/// A message object as delivered by the server.
///
/// The raw JSON is kept as-is; accessors extract the fields the bot layer
/// relies on and report a named [`ShapeError`] when one is missing or has the
/// wrong type. Everything else (reactions, flags, avatar URLs, ...) stays
/// reachable through [`Message::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    raw: Map<String, Value>,
}

impl Message {
    /// Wraps a decoded message object.
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// Wraps a JSON value, failing with [`ShapeError::InvalidMessage`] when it
    /// is not an object.
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        value
            .as_object()
            .cloned()
            .map(Self::new)
            .ok_or(ShapeError::InvalidMessage)
    }

    /// The raw message object.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Consumes the wrapper.
    pub fn into_raw(self) -> Map<String, Value> {
        self.raw
    }

    /// The message ID, when present.
    pub fn id(&self) -> Option<i64> {
        self.raw.get("id").and_then(Value::as_i64)
    }

    /// The message body in Markdown.
    pub fn content(&self) -> Result<&str, ShapeError> {
        self.str_field("content", ShapeError::InvalidMessageContent)
    }

    /// The message type.
    ///
    /// Any type other than `"stream"` is treated as a private message.
    pub fn message_type(&self) -> Result<MessageType, ShapeError> {
        match self.str_field("type", ShapeError::InvalidMessageType)? {
            "stream" => Ok(MessageType::Stream),
            _ => Ok(MessageType::Private),
        }
    }

    /// The topic of a stream message.
    pub fn subject(&self) -> Result<&str, ShapeError> {
        self.str_field("subject", ShapeError::InvalidMessageSubject)
    }

    /// The recipient: a stream name for stream messages, a list of user
    /// objects for private messages.
    pub fn display_recipient(&self) -> Result<&Value, ShapeError> {
        self.raw
            .get("display_recipient")
            .ok_or(ShapeError::InvalidMessageTo)
    }

    pub fn sender_email(&self) -> Result<&str, ShapeError> {
        self.str_field("sender_email", ShapeError::MissingField("sender_email"))
    }

    pub fn sender_full_name(&self) -> Result<&str, ShapeError> {
        self.str_field(
            "sender_full_name",
            ShapeError::MissingField("sender_full_name"),
        )
    }

    fn str_field(&self, key: &str, shape: ShapeError) -> Result<&str, ShapeError> {
        self.raw.get(key).and_then(Value::as_str).ok_or(shape)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(raw: Map<String, Value>) -> Self {
        Self::new(raw)
    }
}
