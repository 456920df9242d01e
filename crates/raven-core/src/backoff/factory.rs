use super::{Backoff, BackoffExt, ConstantBackoff, ExponentialBackoff, StopBackoff, ZeroBackoff};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Produces a fresh backoff generator for each operation call.
#[derive(Clone)]
pub struct BackoffFactory(Arc<dyn Fn() -> Box<dyn Backoff> + Send + Sync>);

impl BackoffFactory {
    pub fn new<F, B>(f: F) -> Self
    where
        F: Fn() -> B + Send + Sync + 'static,
        B: Backoff + 'static,
    {
        Self(Arc::new(move || Box::new(f()) as Box<dyn Backoff>))
    }

    /// Default policy: exponential with no retry limit.
    pub fn exponential() -> Self {
        Self::new(ExponentialBackoff::default)
    }

    pub fn constant(interval: Duration) -> Self {
        Self::new(move || ConstantBackoff(interval))
    }

    pub fn zero() -> Self {
        Self::new(|| ZeroBackoff)
    }

    /// Single attempt, no retries.
    pub fn stop() -> Self {
        Self::new(|| StopBackoff)
    }

    /// Wrap every generator this factory produces with a retry limit.
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self::new(move || self.make().max_retries(max_retries))
    }

    /// Wrap every generator this factory produces with an elapsed-time limit.
    pub fn with_max_elapsed(self, max_elapsed: Duration) -> Self {
        Self::new(move || self.make().max_elapsed(max_elapsed))
    }

    pub fn make(&self) -> Box<dyn Backoff> {
        (self.0)()
    }
}

impl Default for BackoffFactory {
    fn default() -> Self {
        Self::exponential()
    }
}

impl fmt::Debug for BackoffFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackoffFactory(..)")
    }
}
