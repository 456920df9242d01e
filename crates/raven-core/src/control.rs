//! Cancellation for blocking operations.
//!
//! A [`CancelSignal`] is a cloneable flag that retry loops check between
//! attempts and race against while waiting out a backoff interval. Signals can
//! be linked: cancelling a signal also cancels every signal attached to it,
//! which is how a caller's signal and the worker's shutdown signal are both
//! observed by a single wait.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

/// Why a wait or a check ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The signal (or one it is attached to) was cancelled.
    Cancelled,
    /// The deadline passed before the operation finished.
    DeadlineExceeded,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Cancelled => write!(f, "operation cancelled"),
            Interrupt::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

impl std::error::Error for Interrupt {}

#[derive(Default)]
struct State {
    cancelled: bool,
    attached: Vec<Weak<Inner>>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel(&self) {
        let attached = {
            let mut state = self.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            std::mem::take(&mut state.attached)
        };
        self.cond.notify_all();
        for weak in attached {
            if let Some(inner) = weak.upgrade() {
                inner.cancel();
            }
        }
    }
}

/// Shared cancellation flag.
#[derive(Clone, Default)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that is already cancelled.
    pub fn cancelled() -> Self {
        let s = Self::new();
        s.cancel();
        s
    }

    /// Cancel this signal and everything attached to it. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    /// New signal that is cancelled when this one is, but can also be
    /// cancelled on its own without affecting this one.
    pub fn child(&self) -> CancelSignal {
        let child = CancelSignal::new();
        self.attach(&child);
        child
    }

    /// Propagate cancellation of this signal to `other`.
    ///
    /// If this signal is already cancelled, `other` is cancelled immediately.
    pub fn attach(&self, other: &CancelSignal) {
        let already = {
            let mut state = self.inner.lock();
            if !state.cancelled {
                state.attached.retain(|w| w.strong_count() > 0);
                state.attached.push(Arc::downgrade(&other.inner));
            }
            state.cancelled
        };
        if already {
            other.cancel();
        }
    }

    /// Stop propagating cancellation of this signal to `other`.
    pub fn detach(&self, other: &CancelSignal) {
        let target = Arc::as_ptr(&other.inner);
        self.inner
            .lock()
            .attached
            .retain(|w| w.strong_count() > 0 && !std::ptr::eq(w.as_ptr(), target));
    }

    #[cfg(test)]
    pub(crate) fn attached_count(&self) -> usize {
        let state = self.inner.lock();
        state.attached.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Report whether the operation should stop now.
    ///
    /// Cancellation takes precedence over an expired deadline.
    pub fn check(&self, deadline: Option<Instant>) -> Result<(), Interrupt> {
        if self.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        match deadline {
            Some(d) if Instant::now() >= d => Err(Interrupt::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Block for `interval`, returning early if the signal is cancelled or
    /// `deadline` passes first.
    pub fn sleep(&self, interval: Duration, deadline: Option<Instant>) -> Result<(), Interrupt> {
        let wake_at = Instant::now() + interval;
        let mut state = self.inner.lock();
        loop {
            if state.cancelled {
                return Err(Interrupt::Cancelled);
            }
            let now = Instant::now();
            if let Some(d) = deadline {
                if now >= d {
                    return Err(Interrupt::DeadlineExceeded);
                }
            }
            if now >= wake_at {
                return Ok(());
            }
            let until = match deadline {
                Some(d) => wake_at.min(d),
                None => wake_at,
            };
            state = self
                .inner
                .cond
                .wait_timeout(state, until - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
