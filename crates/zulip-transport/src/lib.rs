//! # Zulip Transport
//!
//! Network implementation of the [`HttpClient`](zulip_core::HttpClient)
//! contract defined in `zulip-core`.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zulip_transport::ReqwestClient;
//!
//! let http = Arc::new(ReqwestClient::new()?);
//! let zulip = Zulip::new(config, http);
//! ```

mod http_client;

pub use http_client::{DEFAULT_TIMEOUT, ReqwestClient};
