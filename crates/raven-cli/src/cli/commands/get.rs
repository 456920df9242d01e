//! `raven get <event-id>` – print an event.

use super::print_message;
use anyhow::Result;
use raven_core::{Reference, Worker};

pub fn run_get(worker: &Worker, event_id: &str, ack_id: Option<String>) -> Result<()> {
    let reference = Reference::new(ack_id.unwrap_or_default(), event_id);
    let message = worker.get(&reference)?;
    print_message(&message)?;
    Ok(())
}
