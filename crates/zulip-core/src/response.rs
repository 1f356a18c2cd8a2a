//! Guarded field extraction from loosely-typed JSON responses.
//!
//! Every endpoint answers with a JSON object carrying `result` and `msg`
//! bookkeeping fields next to its payload. [`ApiResponse`] wraps such an
//! object and turns each failed extraction into a named error instead of a
//! silent default:
//!
//! - if the server reported a failure (`result == "error"`, or a non-empty
//!   `msg`), that failure wins and becomes [`ZulipError::Remote`];
//! - otherwise a missing field becomes the caller-chosen [`ShapeError`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ShapeError, ZulipError, ZulipResult};

/// Keys that only describe the transport outcome, not the payload.
pub const BOOKKEEPING_KEYS: [&str; 2] = ["msg", "result"];

/// Fallback message when the server reports an error without text.
const UNKNOWN_ERROR: &str = "unknown error";

/// A raw API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    body: Value,
}

impl ApiResponse {
    /// Wraps a decoded response body.
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Returns the raw body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the server-reported failure, if any.
    pub fn failure(&self) -> Option<ZulipError> {
        let msg = self.body.get("msg").and_then(Value::as_str);
        let is_error = self.body.get("result").and_then(Value::as_str) == Some("error");

        if is_error {
            let message = msg.filter(|m| !m.is_empty()).unwrap_or(UNKNOWN_ERROR);
            return Some(ZulipError::remote(message));
        }

        msg.filter(|m| !m.is_empty()).map(ZulipError::remote)
    }

    /// Fails with the server-reported failure, if any.
    pub fn check(self) -> ZulipResult<Self> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Chooses between the server's failure and a shape error.
    pub fn or_failure(&self, shape: ShapeError) -> ZulipError {
        self.failure().unwrap_or(ZulipError::Shape(shape))
    }

    /// Returns a required child value.
    pub fn field(&self, key: &'static str) -> ZulipResult<&Value> {
        self.body
            .get(key)
            .ok_or_else(|| self.or_failure(ShapeError::MissingField(key)))
    }

    /// Returns a required string child, or `shape` when absent or mistyped.
    pub fn str_field(&self, key: &str, shape: ShapeError) -> ZulipResult<&str> {
        self.body
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| self.or_failure(shape))
    }

    /// Returns a required integer child, or `shape` when absent or mistyped.
    pub fn i64_field(&self, key: &str, shape: ShapeError) -> ZulipResult<i64> {
        self.body
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.or_failure(shape))
    }

    /// Returns a required list child, or `shape` when absent or mistyped.
    pub fn array_field(&self, key: &str, shape: ShapeError) -> ZulipResult<&Vec<Value>> {
        self.body
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| self.or_failure(shape))
    }

    /// Decodes a required child into `T`.
    pub fn decode<T: DeserializeOwned>(
        &self,
        key: &'static str,
        expected: &'static str,
    ) -> ZulipResult<T> {
        let value = self.field(key)?;
        serde_json::from_value(value.clone()).map_err(|_| {
            self.or_failure(ShapeError::InvalidField {
                field: key,
                expected,
            })
        })
    }

    /// Decodes an optional child into `T`; absent or `null` yields `None`.
    pub fn decode_optional<T: DeserializeOwned>(
        &self,
        key: &'static str,
        expected: &'static str,
    ) -> ZulipResult<Option<T>> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| ShapeError::InvalidField {
                    field: key,
                    expected,
                }
                .into()),
        }
    }

    /// Returns the body as an object with the bookkeeping keys removed.
    pub fn into_payload(self) -> ZulipResult<Map<String, Value>> {
        let failure = self.failure();
        match self.body {
            Value::Object(mut map) => {
                for key in BOOKKEEPING_KEYS {
                    map.remove(key);
                }
                Ok(map)
            }
            _ => Err(failure.unwrap_or(ZulipError::Shape(ShapeError::InvalidField {
                field: "response",
                expected: "an object",
            }))),
        }
    }
}

impl From<Value> for ApiResponse {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}
