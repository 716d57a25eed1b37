//! Configuration module for the report visualizer.
//!
//! Settings come from environment variables (optionally via a `.env` file loaded by
//! the binaries), grouped by concern: rendering and observability.

mod observability_config;
mod render_config;

pub use observability_config::ObservabilityEnvConfig;
pub use render_config::{DEFAULT_PLOTLY_JS_URL, ImageFormat, RenderEnvConfig, RenderOverrides};

use anyhow::Result;
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct VizConfig {
    pub render: RenderEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl VizConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            render: RenderEnvConfig::from_env(),
            observability: ObservabilityEnvConfig::from_env(),
        }
    }

    /// Environment configuration with render settings overridden by an optional TOML file.
    pub fn load(render_config_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_env();
        if let Some(path) = render_config_file {
            config.render.apply_toml_file(path)?;
        }
        Ok(config)
    }
}
