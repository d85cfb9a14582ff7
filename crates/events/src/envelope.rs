use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Envelope for an outbound notification, containing routing metadata.
///
/// This is the unit handed to an [`EventBus`](crate::EventBus).
///
/// Notes:
/// - `topic` selects the channel/stream the payload is delivered on.
/// - `key` is an optional partitioning key (e.g. the order number), carried
///   verbatim for transports that support it.
/// - `event_type` and `event_version` are copied from the payload so that
///   consumers can route without decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification<E> {
    topic: String,
    key: Option<String>,
    event_type: String,
    event_version: u32,
    payload: E,
}

impl<E: Event> Notification<E> {
    pub fn new(topic: impl Into<String>, key: Option<String>, payload: E) -> Self {
        Self {
            topic: topic.into(),
            key,
            event_type: payload.event_type().to_string(),
            event_version: payload.version(),
            payload,
        }
    }
}

impl<E> Notification<E> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
