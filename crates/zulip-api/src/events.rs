//! The event queue protocol.
//!
//! ```text
//!   register ──► EventQueue { queue_id, last_event_id }
//!      │
//!      ▼
//!   get(queue_id, last_event_id) ──► [event, event, ...]
//!      │               ▲
//!      │  max(id) ─────┘   (repeat)
//!      ▼
//!   delete_queue(queue_id)
//! ```
//!
//! The caller owns the cursor. Passing the highest event ID seen so far to the
//! next [`Events::get`] acknowledges everything up to it.

use serde_json::Value;

use zulip_core::{Params, ShapeError, ZulipResult, bool_param};

use crate::client::ApiClient;
use crate::model::{EventQueue, RegisterOptions};

/// Client for the `register` and `events` resources.
#[derive(Debug, Clone)]
pub struct Events {
    api: ApiClient,
}

impl Events {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Registers a new event queue.
    pub async fn register(&self, options: &RegisterOptions) -> ZulipResult<EventQueue> {
        let params = options.to_params()?;
        let response = self.api.post("register", params).await?;

        let queue_id = response
            .str_field("queue_id", ShapeError::InvalidQueueId)?
            .to_string();
        let last_event_id = response.i64_field("last_event_id", ShapeError::InvalidEventId)?;

        let mut state = response.into_payload()?;
        state.remove("queue_id");
        state.remove("last_event_id");

        Ok(EventQueue {
            queue_id,
            last_event_id,
            state,
        })
    }

    /// Fetches events newer than `last_event_id`.
    ///
    /// With `dont_block` the server answers immediately, possibly with an
    /// empty list; otherwise it holds the request until an event arrives or
    /// its own timeout passes.
    pub async fn get(
        &self,
        queue_id: &str,
        last_event_id: i64,
        dont_block: bool,
    ) -> ZulipResult<Vec<Value>> {
        let mut params = Params::new();
        params.insert("queue_id".into(), queue_id.into());
        params.insert("last_event_id".into(), last_event_id.to_string());
        params.insert("dont_block".into(), bool_param(dont_block));

        let response = self.api.get("events", params).await?.check()?;
        response
            .array_field("events", ShapeError::InvalidEvents)
            .cloned()
    }

    /// Deletes a queue.
    pub async fn delete_queue(&self, queue_id: &str) -> ZulipResult<()> {
        let mut params = Params::new();
        params.insert("queue_id".into(), queue_id.into());

        self.api.delete("events", params).await?.check().map(drop)
    }
}
