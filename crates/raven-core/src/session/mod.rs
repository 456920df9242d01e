//! Backend session: the one seam between the retry core and a wire format.
//!
//! The worker operations only ever talk to a [`Session`]. A [`Connector`]
//! creates sessions on demand, picking the endpoint through the shared
//! [`EndpointPool`], so a session that reports a lost connection can be
//! replaced without rebuilding the worker.

mod error;
pub mod http;
mod wire;

pub use error::SessionError;
pub use http::{HttpConnector, HttpSession};

use crate::endpoint::EndpointPool;
use crate::message::{AckRequest, Message};
use crate::reference::{EventId, Reference};
use std::sync::Arc;
use std::time::Duration;

/// Flow and worker a session is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub flow_id: String,
    pub worker_id: String,
}

/// Operations the worker needs from a backend, independent of encoding.
///
/// Implementations must be safe to call from several threads at once; the
/// worker adds no locking around calls.
pub trait Session: Send + Sync {
    /// Claim the next unit of work for this worker.
    ///
    /// Returns [`SessionError::NoWork`] when the queue is empty. `timeout`,
    /// when set, is the remaining budget of the surrounding Consume call and
    /// bounds how long the call may block.
    fn claim_work(&self, timeout: Option<Duration>) -> Result<Reference, SessionError>;

    /// Fetch content and metadata of an event in this flow.
    fn fetch_event(&self, event_id: &str) -> Result<Message, SessionError>;

    /// Settle a claimed item, optionally replacing its content and metadata.
    fn acknowledge(&self, ack_id: &str, request: &AckRequest) -> Result<(), SessionError>;

    /// Reserve a fresh event id in this flow.
    fn reserve_event(&self) -> Result<EventId, SessionError>;

    /// Store content and metadata under a reserved event id.
    fn submit_event(&self, event_id: &EventId, message: &Message) -> Result<(), SessionError>;
}

/// Establishes sessions against the configured endpoints.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        pool: &Arc<EndpointPool>,
        identity: &Identity,
    ) -> Result<Arc<dyn Session>, SessionError>;
}
