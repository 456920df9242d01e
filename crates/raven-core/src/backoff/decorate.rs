//! Decorators that turn an unbounded backoff into a bounded one.

use super::Backoff;
use std::time::{Duration, Instant};

/// Stops after `max_retries` intervals have been handed out.
///
/// A retry loop driven by this makes at most `max_retries + 1` attempts.
#[derive(Debug, Clone)]
pub struct MaxRetries<B> {
    inner: B,
    max_retries: u32,
    retries: u32,
}

impl<B: Backoff> MaxRetries<B> {
    pub fn new(inner: B, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            retries: 0,
        }
    }
}

impl<B: Backoff> Backoff for MaxRetries<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        self.retries += 1;
        self.inner.next_backoff()
    }
}

/// Stops once `max_elapsed` has passed since the generator was created.
#[derive(Debug, Clone)]
pub struct MaxElapsed<B> {
    inner: B,
    max_elapsed: Duration,
    started: Instant,
}

impl<B: Backoff> MaxElapsed<B> {
    pub fn new(inner: B, max_elapsed: Duration) -> Self {
        Self {
            inner,
            max_elapsed,
            started: Instant::now(),
        }
    }
}

impl<B: Backoff> Backoff for MaxElapsed<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.started.elapsed() >= self.max_elapsed {
            return None;
        }
        self.inner.next_backoff()
    }
}

/// Builder-style access to the decorators.
pub trait BackoffExt: Backoff + Sized {
    fn max_retries(self, max_retries: u32) -> MaxRetries<Self> {
        MaxRetries::new(self, max_retries)
    }

    fn max_elapsed(self, max_elapsed: Duration) -> MaxElapsed<Self> {
        MaxElapsed::new(self, max_elapsed)
    }
}

impl<B: Backoff> BackoffExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::{ConstantBackoff, StopBackoff, ZeroBackoff};

    #[test]
    fn max_retries_stops_after_limit() {
        let mut b = ZeroBackoff.max_retries(3);
        assert!(b.next_backoff().is_some());
        assert!(b.next_backoff().is_some());
        assert!(b.next_backoff().is_some());
        assert_eq!(b.next_backoff(), None);
        assert_eq!(b.next_backoff(), None);
    }

    #[test]
    fn max_retries_zero_never_retries() {
        let mut b = ZeroBackoff.max_retries(0);
        assert_eq!(b.next_backoff(), None);
    }

    #[test]
    fn inner_stop_wins() {
        let mut b = StopBackoff.max_retries(10);
        assert_eq!(b.next_backoff(), None);
    }

    #[test]
    fn max_elapsed_stops_after_deadline() {
        let mut b = ConstantBackoff(Duration::from_millis(1)).max_elapsed(Duration::from_millis(20));
        assert!(b.next_backoff().is_some());
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(b.next_backoff(), None);
    }
}
