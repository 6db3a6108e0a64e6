//! Tracing setup for the `glowgrid` binary and tools built on the crates.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when neither `RUST_LOG` nor the configured level parses.
const FALLBACK_FILTER: &str = "info";

/// Build the level filter: `RUST_LOG` first, then `config.level`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|e| {
            eprintln!("Invalid log level '{}': {e}; using '{FALLBACK_FILTER}'", config.level);
            EnvFilter::new(FALLBACK_FILTER)
        })
}

/// Install the global subscriber. Later calls are no-ops.
///
/// With `config.file` set, output is appended to that file without ANSI
/// colours; if it cannot be opened, logging falls back to stderr.
pub fn init_logging(config: &LoggingConfig) {
    let (writer, ansi) = match &config.file {
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (BoxMakeWriter::new(std::sync::Mutex::new(file)), false),
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", path.display());
                (BoxMakeWriter::new(std::io::stderr), true)
            }
        },
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(config))
        .with_writer(writer)
        .with_ansi(ansi && !config.json)
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())
    };
    if installed.is_ok() {
        tracing::debug!(level = %config.level, json = config.json, "logging initialised");
    }
}

