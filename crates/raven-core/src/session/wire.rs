//! JSON bodies of the HTTP binding.
//!
//! Content travels as a JSON string, so it must be valid UTF-8. Empty content
//! and empty metadata are omitted from acknowledgment bodies.

use super::SessionError;
use crate::message::{AckRequest, Message, Metadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Vec<Metadata>>,
}

impl WireMessage {
    pub(crate) fn from_message(message: &Message) -> Result<Self, SessionError> {
        Ok(Self {
            content: utf8(&message.content)?.to_string(),
            metadata: Some(message.metadata.clone()),
        })
    }

    pub(crate) fn into_message(self) -> Message {
        Message {
            content: self.content.into_bytes(),
            metadata: self.metadata.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WireAckRequest<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub content: &'a str,
    #[serde(skip_serializing_if = "<[Metadata]>::is_empty")]
    pub metadata: &'a [Metadata],
    pub filter: bool,
}

impl<'a> WireAckRequest<'a> {
    pub(crate) fn from_request(request: &'a AckRequest) -> Result<Self, SessionError> {
        Ok(Self {
            content: utf8(&request.content)?,
            metadata: &request.metadata,
            filter: request.filter,
        })
    }
}

fn utf8(content: &[u8]) -> Result<&str, SessionError> {
    std::str::from_utf8(content).map_err(|_| SessionError::NonUtf8Content)
}

/// Event ids come back as the raw response body; tolerate a JSON-quoted id.
pub(crate) fn parse_event_id(body: &[u8]) -> Result<String, SessionError> {
    let text = String::from_utf8_lossy(body);
    let id = text.trim().trim_matches('"').trim();
    if id.is_empty() {
        return Err(SessionError::EmptyEventId);
    }
    Ok(id.to_string())
}
