//! `raven ack <ack-id> <event-id>` – settle a claimed item, optionally
//! replacing its content and metadata.

use anyhow::Result;
use raven_core::{AckOption, Message, Metadata, Reference, Worker};

/// Options implied by the flags; content or metadata given means the message
/// is replaced.
pub(crate) fn ack_options(
    content: Option<String>,
    meta: Vec<Metadata>,
    filter: bool,
) -> Vec<AckOption> {
    let mut options = Vec::new();
    if content.is_some() || !meta.is_empty() {
        let message = Message::from_text(content.unwrap_or_default()).with_metadata(meta);
        options.push(AckOption::with_message(message));
    }
    if filter {
        options.push(AckOption::with_filter());
    }
    options
}

pub fn run_ack(
    worker: &Worker,
    ack_id: String,
    event_id: String,
    content: Option<String>,
    meta: Vec<Metadata>,
    filter: bool,
) -> Result<()> {
    let reference = Reference::new(ack_id, event_id);
    worker.ack(&reference, ack_options(content, meta, filter))?;
    println!("Acknowledged {reference}");
    Ok(())
}
