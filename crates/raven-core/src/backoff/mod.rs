//! Backoff policies for the operation retry loops.
//!
//! A [`BackoffFactory`] is stored in the worker config and asked for a fresh
//! [`Backoff`] generator at the start of every operation call, so no state
//! leaks between calls. A generator yields wait intervals until it returns
//! `None`, which stops the loop.

mod decorate;
mod factory;
mod policy;

pub use decorate::{BackoffExt, MaxElapsed, MaxRetries};
pub use factory::BackoffFactory;
pub use policy::{Backoff, ConstantBackoff, ExponentialBackoff, StopBackoff, ZeroBackoff};
