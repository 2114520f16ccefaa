// Logging module for structured logging using the tracing crate

use crate::config::LoggingConfig;
use std::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the level filter: RUST_LOG wins over the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, Box<dyn Error>> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

/// Initialize the tracing subscriber for structured logging
///
/// Output goes to stderr so the `generate` command can write JSON to stdout.
/// With `json: true` every event is a single JSON line for log aggregation.
///
/// # Errors
///
/// Returns an error if the level directive is invalid or a global
/// subscriber has already been installed.
///
/// # Examples
///
/// ```
/// use brandgen::config::LoggingConfig;
/// use brandgen::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn Error>> {
    let filter = build_filter(config)?;

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
