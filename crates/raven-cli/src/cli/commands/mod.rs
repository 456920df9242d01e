//! CLI command handlers, one file per command.

mod ack;
mod config;
mod consume;
mod get;
mod produce;

pub use ack::run_ack;
pub use config::run_config;
pub use consume::run_consume;
pub use get::run_get;
pub use produce::run_produce;

#[cfg(test)]
pub(crate) use ack::ack_options;

use raven_core::Message;
use std::io::{self, Write};

/// Metadata as `key=value` lines, a blank line, then the raw content.
pub(crate) fn print_message(message: &Message) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for m in &message.metadata {
        writeln!(out, "{}={}", m.key, m.value)?;
    }
    if !message.metadata.is_empty() {
        writeln!(out)?;
    }
    out.write_all(&message.content)?;
    if !message.content.ends_with(b"\n") {
        writeln!(out)?;
    }
    out.flush()
}
