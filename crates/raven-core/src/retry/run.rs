//! Retry loop: run a session call until success, a non-retryable error,
//! backoff exhaustion or interruption.

use super::Retry;
use crate::backoff::BackoffFactory;
use crate::control::CancelSignal;
use crate::error::WorkerError;
use crate::session::SessionError;
use std::time::{Duration, Instant};

/// A call that timed out this close to the deadline was cut short by it.
/// Covers timer granularity in the transport.
const DEADLINE_SLACK: Duration = Duration::from_millis(10);

/// What a single retry loop runs under.
pub(crate) struct RetryScope<'a> {
    pub operation: &'static str,
    pub retry: Retry,
    pub backoff: &'a BackoffFactory,
    pub signal: &'a CancelSignal,
    pub deadline: Option<Instant>,
}

/// Runs `f` until it succeeds or the loop has to stop.
///
/// `f` receives the 1-based attempt number. Interruption is checked before
/// every attempt and again after a failed one, so a call that only returned
/// because its time budget ran out is reported as the interruption. A
/// timeout error that lands within [`DEADLINE_SLACK`] of the deadline counts
/// as the deadline too.
pub(crate) fn run_with_retry<T, F>(scope: RetryScope<'_>, mut f: F) -> Result<T, WorkerError>
where
    F: FnMut(u32) -> Result<T, SessionError>,
{
    let RetryScope {
        operation,
        retry,
        backoff,
        signal,
        deadline,
    } = scope;

    let started = Instant::now();
    let mut backoff = backoff.make();
    let mut attempt = 1u32;
    loop {
        signal.check(deadline)?;

        let err = match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };

        signal.check(deadline)?;
        if let Some(d) = deadline {
            if err.is_timeout() && Instant::now() + DEADLINE_SLACK >= d {
                tracing::debug!(operation, attempt, error = %err, "attempt ran into the deadline");
                return Err(WorkerError::DeadlineExceeded);
            }
        }

        if !retry.should_retry(&err) {
            tracing::error!(operation, attempt, error = %err, "not retrying");
            return Err(WorkerError::Session {
                operation,
                source: err,
            });
        }

        let Some(interval) = backoff.next_backoff() else {
            let elapsed = started.elapsed();
            tracing::error!(
                operation,
                attempts = attempt,
                elapsed = ?elapsed,
                error = %err,
                "giving up"
            );
            return Err(WorkerError::Exhausted {
                operation,
                attempts: attempt,
                elapsed,
                source: err,
            });
        };

        tracing::debug!(operation, attempt, error = %err, "will retry in {:?}", interval);
        signal.sleep(interval, deadline)?;
        attempt += 1;
    }
}
