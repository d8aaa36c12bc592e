//! Tracing subscriber setup.
//!
//! The TUI owns stdout while it runs, so logs go to a file or nowhere.
//! One-shot commands such as `--list-ports` log to stderr instead.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{MonitorError, MonitorResult};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `logging.file` if configured, otherwise discard.
    FileOrDiscard,
    Stderr,
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn install<W>(config: &LoggingConfig, writer: W, ansi: bool) -> MonitorResult<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(writer)
        .with_ansi(ansi)
        .with_thread_names(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    result.map_err(|e| MonitorError::Logging(e.to_string()))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &LoggingConfig, target: LogTarget) -> MonitorResult<()> {
    match (target, &config.file) {
        (LogTarget::Stderr, _) => install(config, std::io::stderr, true),
        (LogTarget::FileOrDiscard, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| MonitorError::Logging(format!("{}: {e}", path.display())))?;
            install(config, Arc::new(file), false)
        }
        (LogTarget::FileOrDiscard, None) => install(config, std::io::sink, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_to_config_level() {
        let config = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(filter(&config).to_string(), "debug");
        }
    }

    #[test]
    fn test_init_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let config = LoggingConfig {
            file: Some(path.clone()),
            format: LogFormat::Compact,
            ..Default::default()
        };

        // Another test may already own the global subscriber.
        if init(&config, LogTarget::FileOrDiscard).is_ok() {
            tracing::info!("hello from test");
            let contents = std::fs::read_to_string(&path).unwrap();
            assert!(contents.contains("hello from test"));
        }
        assert!(path.exists());
    }
}
