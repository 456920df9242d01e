//! `raven produce <content>` – publish a new event.

use anyhow::Result;
use raven_core::{Message, Metadata, Worker};

pub fn run_produce(worker: &Worker, content: String, meta: Vec<Metadata>) -> Result<()> {
    let message = Message::from_text(content).with_metadata(meta);
    let event_id = worker.produce(&message)?;
    println!("{event_id}");
    Ok(())
}
