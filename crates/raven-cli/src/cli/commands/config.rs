//! `raven config` – show the effective configuration.

use anyhow::Result;
use raven_core::Config;
use std::path::Path;

pub fn run_config(cfg: &Config, path: &Path) -> Result<()> {
    let endpoints: Vec<&str> = cfg.endpoints().iter().map(|u| u.as_str()).collect();
    println!("{:<16} {}", "config file", path.display());
    println!("{:<16} {}", "endpoints", endpoints.join(", "));
    println!("{:<16} {}", "flow id", cfg.flow_id());
    println!("{:<16} {}", "worker id", cfg.worker_id());
    println!(
        "{:<16} {}",
        "consume timeout",
        cfg.consume_timeout()
            .map(|t| format!("{t:?}"))
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "{:<16} {}",
        "max intake",
        cfg.max_intake()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );
    println!("{:<16} {:?}", "http timeout", cfg.http_timeout());
    Ok(())
}
