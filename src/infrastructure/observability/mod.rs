//! Logging setup shared by the binaries.
//!
//! Logs go to stderr so that stdout carries only the console report. `RUST_LOG`
//! takes precedence over `VIZ_LOG_LEVEL`.

use crate::config::ObservabilityEnvConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn init_logging(config: &ObservabilityEnvConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let (json_layer, pretty_layer) = if config.json_logs {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr);
        (None, Some(layer))
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .ok();
}
