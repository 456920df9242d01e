use super::Worker;
use crate::error::WorkerError;
use crate::message::Message;
use crate::reference::Reference;
use crate::retry::{run_with_retry, Retry, RetryScope};

impl Worker {
    /// Fetch the content and metadata of the event behind `reference`.
    ///
    /// Every backend error is retried until the backoff policy gives up.
    pub fn get(&self, reference: &Reference) -> Result<Message, WorkerError> {
        let scope = RetryScope {
            operation: "get",
            retry: Retry::AllErrors,
            backoff: self.config.backoff(),
            signal: &self.shutdown,
            deadline: None,
        };
        let message = run_with_retry(scope, |_| {
            self.call(|s| s.fetch_event(&reference.event_id))
        })?;
        tracing::debug!(
            event_id = %reference.event_id,
            bytes = message.content.len(),
            metadata = message.metadata.len(),
            "fetched event"
        );
        Ok(message)
    }
}
