use super::Worker;
use crate::control::CancelSignal;
use crate::error::WorkerError;
use crate::reference::Reference;
use crate::retry::{run_with_retry, Retry, RetryScope};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// One reserved unit of intake. Released on drop unless committed.
struct IntakeSlot<'a> {
    reserved: Option<&'a AtomicU64>,
}

impl<'a> IntakeSlot<'a> {
    fn unbounded() -> Self {
        Self { reserved: None }
    }

    /// Take a slot if fewer than `max` are held.
    fn reserve(reserved: &'a AtomicU64, max: u64) -> Option<Self> {
        reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()
            .map(|_| Self {
                reserved: Some(reserved),
            })
    }

    fn commit(mut self) {
        self.reserved = None;
    }
}

impl Drop for IntakeSlot<'_> {
    fn drop(&mut self) {
        if let Some(reserved) = self.reserved {
            reserved.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl Worker {
    /// Claim the next unit of work, polling while the queue is empty.
    ///
    /// Same as [`consume_with`](Self::consume_with) with a signal that is
    /// only cancelled by [`shutdown`](Self::shutdown).
    pub fn consume(&self) -> Result<Reference, WorkerError> {
        self.consume_with(&CancelSignal::new())
    }

    /// Claim the next unit of work.
    ///
    /// Only "no work" answers are retried; any other backend error is
    /// returned at once. Returns [`WorkerError::Cancelled`] as soon as
    /// `signal` or the worker shutdown signal fires, and
    /// [`WorkerError::DeadlineExceeded`] once the configured consume timeout
    /// has passed.
    ///
    /// With `max_intake` set, concurrent calls never claim more than that
    /// many items in total; a failed claim frees its slot again.
    pub fn consume_with(&self, signal: &CancelSignal) -> Result<Reference, WorkerError> {
        let slot = match self.config.max_intake() {
            Some(max) => match IntakeSlot::reserve(&self.reserved, max) {
                Some(slot) => slot,
                None => {
                    tracing::info!(max_intake = max, "intake exhausted, not claiming");
                    return Err(WorkerError::IntakeExhausted(max));
                }
            },
            None => IntakeSlot::unbounded(),
        };

        let scope_signal = signal.child();
        self.shutdown.attach(&scope_signal);
        let deadline = self.config.consume_timeout().map(|t| Instant::now() + t);

        let scope = RetryScope {
            operation: "consume",
            retry: Retry::OnlyNoWork,
            backoff: self.config.backoff(),
            signal: &scope_signal,
            deadline,
        };
        let result = run_with_retry(scope, |attempt| {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            tracing::trace!(attempt, ?remaining, "claiming work");
            self.call(|s| s.claim_work(remaining))
        });
        signal.detach(&scope_signal);
        self.shutdown.detach(&scope_signal);
        let reference = result?;

        slot.commit();
        let n = self.intake.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            ack_id = %reference.ack_id,
            event_id = %reference.event_id,
            intake = n,
            "claimed work"
        );
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use crate::backoff::BackoffFactory;
    use crate::config::Config;
    use crate::control::CancelSignal;
    use crate::endpoint::EndpointPool;
    use crate::error::WorkerError;
    use crate::message::{AckRequest, Message};
    use crate::reference::{EventId, Reference};
    use crate::session::{Connector, Identity, Session, SessionError};
    use crate::worker::Worker;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Claims succeed after `empty_polls` "no work" answers; claim number
    /// `fail_at` answers with a server error instead.
    struct Queue {
        empty_polls: u32,
        fail_at: Option<u32>,
        claims: AtomicU32,
    }

    impl Session for Queue {
        fn claim_work(&self, _timeout: Option<Duration>) -> Result<Reference, SessionError> {
            let n = self.claims.fetch_add(1, Ordering::SeqCst);
            if Some(n) == self.fail_at {
                Err(SessionError::InternalServerError)
            } else if n < self.empty_polls {
                Err(SessionError::NoWork)
            } else {
                Ok(Reference::new(format!("ack-{n}"), format!("ev-{n}")))
            }
        }
        fn fetch_event(&self, _: &str) -> Result<Message, SessionError> {
            unreachable!()
        }
        fn acknowledge(&self, _: &str, _: &AckRequest) -> Result<(), SessionError> {
            unreachable!()
        }
        fn reserve_event(&self) -> Result<EventId, SessionError> {
            unreachable!()
        }
        fn submit_event(&self, _: &EventId, _: &Message) -> Result<(), SessionError> {
            unreachable!()
        }
    }

    struct Fixed(Arc<Queue>);

    impl Connector for Fixed {
        fn connect(
            &self,
            _: &Arc<EndpointPool>,
            _: &Identity,
        ) -> Result<Arc<dyn Session>, SessionError> {
            Ok(self.0.clone())
        }
    }

    fn worker(empty_polls: u32, max_intake: u64) -> (Worker, Arc<Queue>) {
        worker_failing_at(empty_polls, max_intake, None)
    }

    fn worker_failing_at(
        empty_polls: u32,
        max_intake: u64,
        fail_at: Option<u32>,
    ) -> (Worker, Arc<Queue>) {
        let queue = Arc::new(Queue {
            empty_polls,
            fail_at,
            claims: AtomicU32::new(0),
        });
        let cfg = Config::builder()
            .endpoint("http://unused")
            .flow_id("f")
            .worker_id("w")
            .backoff(BackoffFactory::zero())
            .max_intake(max_intake)
            .build()
            .unwrap();
        (Worker::with_connector(cfg, Fixed(queue.clone())).unwrap(), queue)
    }

    #[test]
    fn polls_until_work_arrives() {
        let (w, queue) = worker(3, 0);
        let r = w.consume().unwrap();
        assert_eq!(r.ack_id, "ack-3");
        assert_eq!(queue.claims.load(Ordering::SeqCst), 4);
        assert_eq!(w.intake(), 1);
    }

    #[test]
    fn max_intake_stops_claiming() {
        let (w, queue) = worker(0, 2);
        w.consume().unwrap();
        w.consume().unwrap();
        assert!(matches!(w.consume(), Err(WorkerError::IntakeExhausted(2))));
        assert_eq!(queue.claims.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shutdown_cancels_consume() {
        let (w, queue) = worker(0, 0);
        w.shutdown();
        assert!(matches!(
            w.consume_with(&CancelSignal::new()),
            Err(WorkerError::Cancelled)
        ));
        assert_eq!(queue.claims.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_claim_frees_its_intake_slot() {
        let (w, queue) = worker_failing_at(0, 1, Some(0));
        assert!(matches!(
            w.consume(),
            Err(WorkerError::Session {
                source: SessionError::InternalServerError,
                ..
            })
        ));
        assert_eq!(w.intake(), 0);
        w.consume().unwrap();
        assert!(matches!(w.consume(), Err(WorkerError::IntakeExhausted(1))));
        assert_eq!(queue.claims.load(Ordering::SeqCst), 2);
        assert_eq!(w.intake(), 1);
    }

    #[test]
    fn repeated_consumes_leave_no_attached_signals() {
        let (w, _queue) = worker(0, 0);
        let signal = CancelSignal::new();
        for _ in 0..20 {
            w.consume_with(&signal).unwrap();
        }
        let _ = w.consume_with(&CancelSignal::cancelled());
        assert_eq!(signal.attached_count(), 0);
        assert_eq!(w.shutdown_signal().attached_count(), 0);
    }
}
