pub mod backoff;
pub mod config;
pub mod control;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod message;
pub mod reference;
pub mod retry;
pub mod session;
pub mod worker;

pub use backoff::{Backoff, BackoffExt, BackoffFactory, ExponentialBackoff};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use control::{CancelSignal, Interrupt};
pub use endpoint::EndpointPool;
pub use error::WorkerError;
pub use message::{AckRequest, Message, Metadata};
pub use reference::{EventId, Reference};
pub use session::{Connector, Identity, Session, SessionError};
pub use worker::{AckOption, Worker};
