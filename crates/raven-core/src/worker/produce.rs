use super::Worker;
use crate::error::WorkerError;
use crate::message::Message;
use crate::reference::EventId;
use crate::retry::{run_with_retry, Retry, RetryScope};

impl Worker {
    /// Publish a new event into the flow and return its id.
    ///
    /// Reservation and submission share one retry loop: a failed submission
    /// reserves a fresh id on the next attempt. Ids reserved by failed
    /// attempts are left unused on the backend.
    pub fn produce(&self, message: &Message) -> Result<EventId, WorkerError> {
        let scope = RetryScope {
            operation: "produce",
            retry: Retry::AllErrors,
            backoff: self.config.backoff(),
            signal: &self.shutdown,
            deadline: None,
        };
        let event_id = run_with_retry(scope, |attempt| {
            let event_id = self.call(|s| s.reserve_event())?;
            tracing::trace!(attempt, %event_id, "reserved event id");
            self.call(|s| s.submit_event(&event_id, message))?;
            Ok(event_id)
        })?;
        tracing::debug!(%event_id, bytes = message.content.len(), "produced event");
        Ok(event_id)
    }
}
