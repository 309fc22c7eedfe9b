//! Tracing setup for the CLI and the TUI.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// `RUST_LOG` wins over `level` when set.
fn filter(level: &str) -> EnvFilter {
    let default = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

/// Log to stderr, for one-shot subcommands.
pub fn init_stderr(level: &str) -> Result<()> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter(level)))
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// Log to `path` if given, otherwise not at all.
///
/// The TUI owns the terminal, so nothing may go to stdout or stderr.
pub fn init_tui(level: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter(level)))
        .try_init()
        .map_err(|e| anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_level_falls_back() {
        // neither panics nor rejects an unknown level name
        let _ = filter("loud");
        let _ = filter("debug");
    }

    #[test]
    fn test_tui_without_file_is_silent() {
        assert!(init_tui("info", None).is_ok());
    }
}
