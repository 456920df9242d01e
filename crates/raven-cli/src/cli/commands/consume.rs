//! `raven consume` – claim the next unit of work; with --ack also process it.

use super::print_message;
use anyhow::Result;
use raven_core::{AckOption, Worker};

pub fn run_consume(worker: &Worker, ack: bool, filter: bool) -> Result<()> {
    let reference = worker.consume()?;
    println!("{reference}");
    if !ack {
        return Ok(());
    }

    let message = worker.get(&reference)?;
    print_message(&message)?;
    worker.ack(&reference, filter.then(AckOption::with_filter))?;
    tracing::info!(ack_id = %reference.ack_id, filter, "acknowledged from cli");
    Ok(())
}
