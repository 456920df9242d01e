//! CLI for raven workers.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use raven_core::config::{self, parse_duration};
use raven_core::{ConfigBuilder, Metadata, Worker};
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_ack, run_config, run_consume, run_get, run_produce};

/// Top-level CLI for raven workers.
#[derive(Debug, Parser)]
#[command(name = "raven")]
#[command(about = "raven: claim, inspect, acknowledge and produce flow events", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/raven/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Claim the next unit of work and print its reference.
    Consume {
        /// Fetch the event, print it and acknowledge it.
        #[arg(long)]
        ack: bool,
        /// With --ack: filter the item out of the flow.
        #[arg(long, requires = "ack")]
        filter: bool,
        /// Give up after this long, e.g. 30s (overrides CONSUME_TIMEOUT).
        #[arg(long, value_parser = parse_timeout, value_name = "DURATION")]
        timeout: Option<Duration>,
    },

    /// Print the content and metadata of an event.
    Get {
        event_id: String,
        /// Ack id of the claim, if any (only used in log output).
        #[arg(long)]
        ack_id: Option<String>,
    },

    /// Acknowledge a claimed item.
    Ack {
        ack_id: String,
        event_id: String,
        /// Replace the event content.
        #[arg(long)]
        content: Option<String>,
        /// Replace the metadata; repeat for several entries, order is kept.
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
        meta: Vec<Metadata>,
        /// Filter the item out of the flow.
        #[arg(long)]
        filter: bool,
    },

    /// Publish a new event and print its id.
    Produce {
        content: String,
        /// Metadata entry; repeat for several entries, order is kept.
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
        meta: Vec<Metadata>,
    },

    /// Show the effective configuration.
    Config,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

fn parse_meta(s: &str) -> Result<Metadata, String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(Metadata::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

impl Cli {
    /// Settings from the config file, then the environment.
    fn config_builder(&self) -> Result<(ConfigBuilder, PathBuf)> {
        let (file, path) = match &self.config {
            Some(path) => (config::load_from(path)?, path.clone()),
            None => (config::load_or_init()?, config::config_path()?),
        };
        tracing::debug!("loaded config from {}: {:?}", path.display(), file);
        let builder = ConfigBuilder::default()
            .apply_file(&file)
            .with_context(|| format!("config file {}", path.display()))?
            .apply_env()
            .context("environment")?;
        Ok((builder, path))
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let (mut builder, path) = cli.config_builder()?;

        if let CliCommand::Consume {
            timeout: Some(t), ..
        } = &cli.command
        {
            builder = builder.consume_timeout(*t);
        }
        let cfg = builder.build()?;

        match cli.command {
            CliCommand::Config => run_config(&cfg, &path)?,
            CliCommand::Consume { ack, filter, .. } => {
                run_consume(&Worker::new(cfg)?, ack, filter)?;
            }
            CliCommand::Get { event_id, ack_id } => {
                run_get(&Worker::new(cfg)?, &event_id, ack_id)?;
            }
            CliCommand::Ack {
                ack_id,
                event_id,
                content,
                meta,
                filter,
            } => run_ack(&Worker::new(cfg)?, ack_id, event_id, content, meta, filter)?,
            CliCommand::Produce { content, meta } => {
                run_produce(&Worker::new(cfg)?, content, meta)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
