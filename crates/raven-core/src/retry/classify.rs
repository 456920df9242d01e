//! Which session errors an operation keeps retrying.

use crate::session::SessionError;

/// Retry classification of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Poll again only on [`SessionError::NoWork`]; any other error ends the
    /// loop at once so backend or config failures are not mistaken for an
    /// empty queue. Used by Consume.
    OnlyNoWork,
    /// Treat every session error as transient until the backoff gives up.
    /// Used by Get, Ack and Produce.
    AllErrors,
}

impl Retry {
    pub fn should_retry(self, err: &SessionError) -> bool {
        match self {
            Retry::OnlyNoWork => err.is_no_work(),
            Retry::AllErrors => true,
        }
    }
}
