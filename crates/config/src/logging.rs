//! Logging configuration for the prehook CLI
//!
//! Compact terminal output on stderr plus optional file logging using tracing.

use prehook_core::{Error, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given verbosity
fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("prehook={level},prehook_core={level},prehook_config={level},prehook_engine={level}")
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging
/// * `log_file` - Optional path to append logs to (always at debug level)
///
/// `RUST_LOG` overrides the terminal filter.
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode with a debug log file
/// init(true, Some(Path::new("prehook.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // Timestamps only in verbose mode
    let stderr_layer = if verbose {
        stderr_layer.with_filter(env_filter).boxed()
    } else {
        stderr_layer.without_time().with_filter(env_filter).boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            let file_filter = EnvFilter::try_new("debug")
                .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
