//! Stream and subscription models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stream as listed by `GET /streams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub stream_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub invite_only: bool,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One of the current user's subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub stream_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub invite_only: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub pin_to_top: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stream to subscribe to, created on the fly if it does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StreamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Description used when the stream gets created.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Filters for `GET /streams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetStreamsOptions {
    pub include_public: bool,
    pub include_subscribed: bool,
    pub include_default: bool,
    /// Every active stream in the realm. Admin only; the server rejects the
    /// request otherwise.
    pub include_all_active: bool,
}

impl Default for GetStreamsOptions {
    fn default() -> Self {
        Self {
            include_public: true,
            include_subscribed: true,
            include_default: false,
            include_all_active: false,
        }
    }
}

/// Options for `POST /users/me/subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub invite_only: bool,
    pub announce: bool,
    /// Users to subscribe; empty means the current user.
    pub principals: Vec<String>,
    pub authorization_errors_fatal: bool,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            invite_only: false,
            announce: false,
            principals: Vec::new(),
            authorization_errors_fatal: true,
        }
    }
}

/// Outcome of a subscribe call.
///
/// `subscribed` and `already_subscribed` map a user's email to stream names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeResult {
    pub subscribed: HashMap<String, Vec<String>>,
    pub already_subscribed: HashMap<String, Vec<String>>,
    /// Streams the user may not join; only reported when
    /// `authorization_errors_fatal` is off.
    pub unauthorized: Vec<String>,
}

/// Outcome of an unsubscribe call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsubscribeResult {
    pub removed: Vec<String>,
    pub not_subscribed: Vec<String>,
}
