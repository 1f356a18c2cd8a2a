//! Where a reply to a message goes.

use serde_json::Value;

use zulip_api::{Message, MessageType, Messages};
use zulip_core::{ShapeError, ZulipResult};

/// Destination of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Same stream, same topic.
    Stream { to: String, subject: String },
    /// Everyone in the private conversation, as comma-separated emails.
    Private { to: String },
}

impl ReplyTarget {
    /// Derives the reply destination from the original message.
    ///
    /// Recipients of a private message without an `email` are left out; a
    /// private message with no addressable recipient is `InvalidMessageTo`.
    pub fn from_message(message: &Message) -> Result<Self, ShapeError> {
        match message.message_type()? {
            MessageType::Stream => {
                let subject = message.subject()?.to_string();
                let to = message
                    .display_recipient()?
                    .as_str()
                    .ok_or(ShapeError::InvalidMessageTo)?
                    .to_string();
                Ok(Self::Stream { to, subject })
            }
            MessageType::Private => {
                let recipients = message
                    .display_recipient()?
                    .as_array()
                    .ok_or(ShapeError::InvalidMessageTo)?;
                let to = recipients
                    .iter()
                    .filter_map(|r| r.get("email").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(",");
                if to.is_empty() {
                    return Err(ShapeError::InvalidMessageTo);
                }
                Ok(Self::Private { to })
            }
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Stream { .. } => MessageType::Stream,
            Self::Private { .. } => MessageType::Private,
        }
    }

    pub fn to(&self) -> &str {
        match self {
            Self::Stream { to, .. } | Self::Private { to } => to,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Stream { subject, .. } => Some(subject),
            Self::Private { .. } => None,
        }
    }

    /// Sends `content` to this destination.
    pub async fn send(&self, messages: &Messages, content: &str) -> ZulipResult<i64> {
        messages
            .send(self.message_type(), self.to(), self.subject(), content)
            .await
    }
}
