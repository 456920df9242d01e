//! Log output for raven processes.
//!
//! Workers log to `raven.log` in the XDG state directory, so a consumer left
//! running in the background keeps a record of its claims and retries. The
//! `RUST_LOG` variable replaces the default filter, which shows raven's own
//! crates at debug and everything else at info.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,raven_core=debug,raven_cli=debug";

/// Destination of one formatted log line.
enum LogSink {
    Log(fs::File),
    /// The shared log handle could not be duplicated for this line.
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::Log(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::Log(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Append-mode log file shared by every thread of the worker.
struct AppendLog(fs::File);

impl<'a> MakeWriter<'a> for AppendLog {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::Log(f),
            Err(_) => LogSink::Stderr,
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_append(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

/// Where the worker log is written: `$XDG_STATE_HOME/raven/raven.log`.
pub fn log_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("raven")?;
    Ok(dirs.get_state_home().join("raven.log"))
}

/// Send worker logs to [`log_path`].
///
/// Nothing is installed on error; the CLI then calls
/// [`init_logging_stderr`] and reports why the file was unusable.
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    let file = open_append(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(BoxMakeWriter::new(AppendLog(file)))
        .with_ansi(false)
        .init();

    tracing::info!(path = %path.display(), "raven worker log opened");
    Ok(())
}

/// Send worker logs to stderr.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
