//! Operation retry loop.
//!
//! Every worker operation runs its session calls through `run_with_retry`:
//! attempt, classify the failure, ask a fresh backoff generator for the next
//! interval, wait (interruptibly), repeat. Classification is explicit per
//! operation; see [`Retry`].

mod classify;
mod run;

pub use classify::Retry;
pub(crate) use run::{run_with_retry, RetryScope};
