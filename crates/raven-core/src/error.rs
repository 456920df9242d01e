//! Errors returned by worker operations.

use crate::config::ConfigError;
use crate::control::Interrupt;
use crate::session::SessionError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// The caller's signal or the worker shutdown signal fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The consume timeout elapsed before work was claimed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("max intake of {0} message(s) reached")]
    IntakeExhausted(u64),

    /// The backoff policy said stop; `source` is the last error seen.
    #[error("{operation} failed after {attempts} attempt(s) in {elapsed:?}: {source}")]
    Exhausted {
        operation: &'static str,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: SessionError,
    },

    /// Non-retryable session error.
    #[error("{operation}: {source}")]
    Session {
        operation: &'static str,
        #[source]
        source: SessionError,
    },

    #[error("connect: {0}")]
    Connect(#[source] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorkerError {
    /// Session error behind this failure, if any.
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            WorkerError::Exhausted { source, .. }
            | WorkerError::Session { source, .. }
            | WorkerError::Connect(source) => Some(source),
            _ => None,
        }
    }

    /// True for cancellation and deadline expiry.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, WorkerError::Cancelled | WorkerError::DeadlineExceeded)
    }
}

impl From<Interrupt> for WorkerError {
    fn from(i: Interrupt) -> Self {
        match i {
            Interrupt::Cancelled => WorkerError::Cancelled,
            Interrupt::DeadlineExceeded => WorkerError::DeadlineExceeded,
        }
    }
}
