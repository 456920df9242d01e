use std::time::Duration;

/// Generator of successive retry intervals.
///
/// Returning `None` means stop: the caller gives up and reports the last error.
pub trait Backoff: Send {
    fn next_backoff(&mut self) -> Option<Duration>;
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }
}

/// Exponential backoff with a capped interval and no retry limit.
///
/// Wrap with [`super::MaxRetries`] or [`super::MaxElapsed`] to make it stop.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// First interval handed out.
    pub initial_interval: Duration,
    /// Factor applied to the interval after every call.
    pub multiplier: f64,
    /// Upper bound on any single interval.
    pub max_interval: Duration,
    current: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial_interval: Duration, multiplier: f64, max_interval: Duration) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier >= 1.0 {
            multiplier
        } else {
            1.0
        };
        let max_interval = max_interval.max(initial_interval);
        Self {
            initial_interval,
            multiplier,
            max_interval,
            current: initial_interval,
        }
    }

    /// Restart from the initial interval.
    pub fn reset(&mut self) {
        self.current = self.initial_interval;
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 1.5, Duration::from_secs(60))
    }
}

impl Backoff for ExponentialBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        let next = self.current;
        let grown = self.current.as_secs_f64() * self.multiplier;
        self.current = if grown >= self.max_interval.as_secs_f64() {
            self.max_interval
        } else {
            Duration::from_secs_f64(grown)
        };
        Some(next)
    }
}

/// Same interval every time, forever.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBackoff(pub Duration);

impl Backoff for ConstantBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.0)
    }
}

/// Retry immediately, forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroBackoff;

impl Backoff for ZeroBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopBackoff;

impl Backoff for StopBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }
}
