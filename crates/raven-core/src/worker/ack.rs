use super::Worker;
use crate::error::WorkerError;
use crate::message::{AckRequest, Message};
use crate::reference::Reference;
use crate::retry::{run_with_retry, Retry, RetryScope};

/// Adjustment applied to the acknowledgement request.
#[derive(Debug, Clone, PartialEq)]
pub enum AckOption {
    /// Replace the event's content and metadata.
    Message(Message),
    /// Mark the item as filtered out of the flow.
    Filter,
}

impl AckOption {
    pub fn with_message(message: Message) -> Self {
        AckOption::Message(message)
    }

    pub fn with_filter() -> Self {
        AckOption::Filter
    }

    fn apply(self, request: &mut AckRequest) {
        match self {
            AckOption::Message(m) => {
                request.content = m.content;
                request.metadata = m.metadata;
            }
            AckOption::Filter => request.filter = true,
        }
    }
}

/// Fold options, in order, onto a default request.
pub(crate) fn build_request<I>(options: I) -> AckRequest
where
    I: IntoIterator<Item = AckOption>,
{
    let mut request = AckRequest::default();
    for option in options {
        option.apply(&mut request);
    }
    request
}

impl Worker {
    /// Settle a claimed item.
    ///
    /// With no options this is a plain acknowledgement. The reference must
    /// not be acknowledged twice; concurrent acks of the same reference are
    /// the caller's problem.
    pub fn ack<I>(&self, reference: &Reference, options: I) -> Result<(), WorkerError>
    where
        I: IntoIterator<Item = AckOption>,
    {
        let request = build_request(options);
        let scope = RetryScope {
            operation: "ack",
            retry: Retry::AllErrors,
            backoff: self.config.backoff(),
            signal: &self.shutdown,
            deadline: None,
        };
        run_with_retry(scope, |_| {
            self.call(|s| s.acknowledge(&reference.ack_id, &request))
        })?;
        tracing::debug!(
            ack_id = %reference.ack_id,
            filter = request.filter,
            plain = request.is_plain(),
            "acknowledged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Metadata;

    #[test]
    fn no_options_is_plain() {
        let req = build_request([]);
        assert!(req.is_plain());
        assert_eq!(req, AckRequest::default());
    }

    #[test]
    fn message_and_filter_combine_in_any_order() {
        let msg = Message::from_text("out").push_metadata("k", "v");
        for opts in [
            vec![AckOption::with_message(msg.clone()), AckOption::with_filter()],
            vec![AckOption::with_filter(), AckOption::with_message(msg.clone())],
        ] {
            let req = build_request(opts);
            assert!(req.filter);
            assert_eq!(req.content, b"out");
            assert_eq!(req.metadata, vec![Metadata::new("k", "v")]);
        }
    }

    #[test]
    fn later_message_wins() {
        let req = build_request([
            AckOption::with_message(Message::from_text("first")),
            AckOption::with_message(Message::from_text("second")),
        ]);
        assert_eq!(req.content, b"second");
        assert!(!req.filter);
    }
}
