//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout carries only command output. `RUST_LOG`
//! wins over the configured level.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use wsync_sync::{LogFormat, SyncConfig};

/// Install the global subscriber
///
/// # Errors
/// Returns error if the configured level is not a valid filter directive
/// or a subscriber is already installed
pub fn init_tracing(config: &SyncConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level `{}`", config.log_level))?,
    };

    Registry::default()
        .with(vec![build_stderr_layer(config.log_format), Box::new(filter)])
        .try_init()
        .context("tracing subscriber already installed")
}

fn build_stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        ),
    }
}
