//! # Zulip Core
//!
//! Shared building blocks for the Zulip client crates:
//!
//! - [`Config`]: account credentials and the realm's API base URL
//! - [`HttpClient`]: the transport contract the resource clients call into
//! - [`ApiResponse`]: guarded extraction of fields from JSON responses
//! - [`ZulipError`] and friends: the error taxonomy
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────┐
//! │  zulip-bots         │  (bot handler, mention dispatch)
//! ├─────────────────────┤
//! │  zulip-api          │  (Messages, Streams, Users, Events)
//! ├─────────────────────┤
//! │  zulip-core         │  <- This crate (contract + errors)
//! ├─────────────────────┤
//! │  zulip-transport    │  (reqwest implementation)
//! └─────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod response;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{API_PATH, Config};
pub use error::{
    PayloadField, ShapeError, TransportError, TransportResult, ZulipError, ZulipResult,
};
pub use http::{BoxedHttpClient, Credentials, HttpClient, Method, Params, bool_param};
pub use response::ApiResponse;
