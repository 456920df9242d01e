//! Identifiers handed out by the backend for claimed and reserved events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one claimed unit of work.
///
/// `ack_id` authorizes a single acknowledgment; `event_id` addresses the
/// content and stays valid for `get` until the item is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub ack_id: String,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
}

impl Reference {
    pub fn new(ack_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            ack_id: ack_id.into(),
            event_id: event_id.into(),
            flow_id: None,
        }
    }

    pub fn event_id(&self) -> EventId {
        EventId(self.event_id.clone())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ack={} event={}", self.ack_id, self.event_id)
    }
}

/// Event identifier reserved by the backend for a new event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
