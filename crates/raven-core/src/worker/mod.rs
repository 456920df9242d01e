//! Worker client: config, endpoint pool, session and the four operations.
//!
//! ```no_run
//! use raven_core::{AckOption, Config, Message, Worker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = Config::builder()
//!     .endpoints("http://raven-1:8080,http://raven-2:8080")
//!     .flow_id("flow")
//!     .worker_id("worker")
//!     .build()?;
//! let worker = Worker::new(cfg)?;
//!
//! let reference = worker.consume()?;
//! let message = worker.get(&reference)?;
//! let upper = Message::from_text(message.text().unwrap_or_default().to_uppercase());
//! worker.ack(&reference, [AckOption::with_message(upper)])?;
//! # Ok(())
//! # }
//! ```

mod ack;
mod consume;
mod get;
mod produce;

pub use ack::AckOption;

use crate::config::Config;
use crate::control::CancelSignal;
use crate::endpoint::EndpointPool;
use crate::error::WorkerError;
use crate::session::{Connector, HttpConnector, Identity, Session, SessionError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Client for one worker in one flow.
///
/// All operations block the calling thread. The worker is `Sync`: operations
/// may be called from several threads, sharing the endpoint rotation and the
/// session.
pub struct Worker {
    config: Config,
    pool: Arc<EndpointPool>,
    identity: Identity,
    connector: Box<dyn Connector>,
    session: Mutex<Option<Arc<dyn Session>>>,
    shutdown: CancelSignal,
    intake: AtomicU64,
    /// Claimed plus in-flight claims; bounded by `max_intake`.
    reserved: AtomicU64,
}

impl Worker {
    /// Worker speaking the HTTP+JSON binding.
    pub fn new(config: Config) -> Result<Self, WorkerError> {
        let connector = HttpConnector::new(config.http_timeout(), config.user_agent());
        Self::with_connector(config, connector)
    }

    /// Worker using a custom session binding. Connects once before returning.
    pub fn with_connector<C>(config: Config, connector: C) -> Result<Self, WorkerError>
    where
        C: Connector + 'static,
    {
        let pool = Arc::new(EndpointPool::new(config.endpoints().to_vec())?);
        let identity = Identity {
            flow_id: config.flow_id().to_string(),
            worker_id: config.worker_id().to_string(),
        };
        let worker = Self {
            config,
            pool,
            identity,
            connector: Box::new(connector),
            session: Mutex::new(None),
            shutdown: CancelSignal::new(),
            intake: AtomicU64::new(0),
            reserved: AtomicU64::new(0),
        };
        let session = worker.connect().map_err(WorkerError::Connect)?;
        *worker.session_slot() = Some(session);
        Ok(worker)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn endpoints(&self) -> &EndpointPool {
        &self.pool
    }

    /// Number of items claimed so far.
    pub fn intake(&self) -> u64 {
        self.intake.load(Ordering::Relaxed)
    }

    /// Cancel every pending and future backoff wait of this worker.
    pub fn shutdown(&self) {
        tracing::info!("worker shutdown requested");
        self.shutdown.cancel();
    }

    /// Signal cancelled by [`shutdown`](Self::shutdown).
    pub fn shutdown_signal(&self) -> &CancelSignal {
        &self.shutdown
    }

    fn connect(&self) -> Result<Arc<dyn Session>, SessionError> {
        let session = self.connector.connect(&self.pool, &self.identity)?;
        tracing::info!(
            flow_id = %self.identity.flow_id,
            worker_id = %self.identity.worker_id,
            "connected"
        );
        Ok(session)
    }

    fn session_slot(&self) -> MutexGuard<'_, Option<Arc<dyn Session>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current session, reconnecting if the previous one was dropped.
    fn session(&self) -> Result<Arc<dyn Session>, SessionError> {
        let mut slot = self.session_slot();
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }
        let session = self.connect()?;
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Run one session call; drop the session if it reports a lost
    /// connection so the next attempt reconnects.
    fn call<T>(
        &self,
        f: impl FnOnce(&dyn Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.session()?;
        let result = f(&*session);
        if let Err(e) = &result {
            if e.is_connection_lost() {
                let mut slot = self.session_slot();
                if slot.as_ref().is_some_and(|s| Arc::ptr_eq(s, &session)) {
                    tracing::warn!(error = %e, "session lost, reconnecting on next attempt");
                    *slot = None;
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("identity", &self.identity)
            .field("endpoints", &self.pool.len())
            .field("intake", &self.intake())
            .finish_non_exhaustive()
    }
}
