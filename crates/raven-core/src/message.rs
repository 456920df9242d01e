//! Work item payloads: opaque content bytes plus ordered metadata.

use serde::{Deserialize, Serialize};

/// One metadata entry. Keys may repeat; order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub key: String,
    pub value: String,
}

impl Metadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Content and metadata of an event, as produced, acknowledged or fetched.
///
/// Content is opaque to the client; callers may put JSON or text inside it.
/// Metadata is a sequence, not a map: it is sent and returned in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub content: Vec<u8>,
    pub metadata: Vec<Metadata>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message whose content is the UTF-8 bytes of `s`.
    pub fn from_text(s: impl Into<String>) -> Self {
        Self {
            content: s.into().into_bytes(),
            metadata: Vec::new(),
        }
    }

    /// Message whose content is `value` encoded as JSON.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            content: serde_json::to_vec(value)?,
            metadata: Vec::new(),
        })
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append one metadata entry, keeping existing entries and their order.
    pub fn push_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata::new(key, value));
        self
    }

    /// Content as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// Decode the content as JSON into `T`.
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.content)
    }

    /// First metadata value stored under `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.as_str())
    }
}

/// Body of an acknowledgment.
///
/// The default is a pure acknowledgment: no content or metadata override and
/// no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckRequest {
    pub content: Vec<u8>,
    pub metadata: Vec<Metadata>,
    /// Stop further pipeline processing of the item.
    pub filter: bool,
}

impl AckRequest {
    /// True when the request neither mutates nor filters the item.
    pub fn is_plain(&self) -> bool {
        self.content.is_empty() && self.metadata.is_empty() && !self.filter
    }
}
