//! Errors reported by a backend session.

use thiserror::Error;

/// Outcome of a failed session call.
///
/// `NoWork` is not a failure of the backend: it is the "queue currently empty"
/// answer to a claim and the only error Consume keeps polling on.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no work available")]
    NoWork,

    #[error("not found")]
    NotFound,

    #[error("no content")]
    NoContent,

    #[error("internal server error")]
    InternalServerError,

    #[error("{method} {url} returned HTTP {code}")]
    Status {
        method: &'static str,
        url: String,
        code: u32,
    },

    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    #[error("encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("message content is not valid UTF-8")]
    NonUtf8Content,

    #[error("backend returned an empty event id")]
    EmptyEventId,

    /// The session can no longer be used; the worker drops it and reconnects
    /// on the next attempt.
    #[error("session disconnected: {0}")]
    Disconnected(String),

    /// Error raised by the backend itself, passed through verbatim.
    #[error("backend: {0}")]
    Backend(String),
}

impl SessionError {
    pub fn is_no_work(&self) -> bool {
        matches!(self, SessionError::NoWork)
    }

    pub fn is_connection_lost(&self) -> bool {
        matches!(self, SessionError::Disconnected(_))
    }

    /// The call gave up because its time limit ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Transport(e) if e.is_operation_timedout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_timeouts_are_timeouts() {
        assert!(SessionError::Transport(curl::Error::new(28)).is_timeout());
        assert!(!SessionError::Transport(curl::Error::new(7)).is_timeout());
        assert!(!SessionError::NoWork.is_timeout());
        assert!(!SessionError::Disconnected("reset".into()).is_timeout());
    }
}
