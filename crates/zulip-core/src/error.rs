//! Unified error types for the Zulip client.
//!
//! Errors fall into four families:
//!
//! - [`ZulipError::Serialization`]: a structured parameter could not be encoded,
//!   so no request was sent.
//! - [`ZulipError::Transport`]: the HTTP layer failed ([`TransportError`]).
//! - [`ZulipError::Remote`]: the server answered but reported a failure.
//! - [`ZulipError::Shape`]: the server answered but a field was missing or had
//!   the wrong type ([`ShapeError`]).

use std::fmt;

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised by an [`HttpClient`](crate::http::HttpClient) implementation.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The URL that was requested.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The server answered with a body that is not JSON.
    #[error("HTTP {status} error: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client could not be constructed.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// Shape Errors
// =============================================================================

/// A response was received but did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The current user's full name could not be determined.
    #[error("invalid mention: the current user's full name is unavailable")]
    InvalidMention,

    /// The registered queue has no usable `queue_id`.
    #[error("invalid queue id")]
    InvalidQueueId,

    /// An event's `message` is not an object.
    #[error("invalid message")]
    InvalidMessage,

    /// An event has no numeric `id`.
    #[error("invalid event id")]
    InvalidEventId,

    /// The `events` field is missing or is not a list.
    #[error("invalid events")]
    InvalidEvents,

    /// A message has no string `content`, or a bot produced no reply.
    #[error("invalid message content")]
    InvalidMessageContent,

    /// A message has no string `type`.
    #[error("invalid message type")]
    InvalidMessageType,

    /// A message's recipient cannot be determined.
    #[error("invalid message recipient")]
    InvalidMessageTo,

    /// A stream message has no string `subject`.
    #[error("invalid message subject")]
    InvalidMessageSubject,

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type.
    #[error("field `{field}` is not {expected}")]
    InvalidField {
        /// The field name.
        field: &'static str,
        /// Human-readable description of the expected type.
        expected: &'static str,
    },
}

// =============================================================================
// Zulip Errors
// =============================================================================

/// A structured request parameter that is JSON-encoded before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    EventTypes,
    FetchEventTypes,
    Narrow,
    Streams,
    Principals,
    StreamNames,
}

impl PayloadField {
    /// Returns the parameter name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventTypes => "event_types",
            Self::FetchEventTypes => "fetch_event_types",
            Self::Narrow => "narrow",
            Self::Streams => "subscriptions",
            Self::Principals => "principals",
            Self::StreamNames => "stream_names",
        }
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for every resource-client call.
#[derive(Debug, Clone, Error)]
pub enum ZulipError {
    /// A parameter could not be JSON-encoded; nothing was sent.
    #[error("failed to serialize {field}: {reason}")]
    Serialization {
        /// Which parameter failed.
        field: PayloadField,
        /// The encoder's message.
        reason: String,
    },

    /// The HTTP layer failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server reported a failure.
    #[error("server error: {message}")]
    Remote {
        /// The server's `msg` text.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl ZulipError {
    /// Creates a remote error carrying the server's message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Creates a serialization error for the given parameter.
    pub fn serialization(field: PayloadField, err: impl fmt::Display) -> Self {
        Self::Serialization {
            field,
            reason: err.to_string(),
        }
    }

    /// Returns the shape error, if this is one.
    pub fn as_shape(&self) -> Option<&ShapeError> {
        match self {
            Self::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for resource-client calls.
pub type ZulipResult<T> = Result<T, ZulipError>;
