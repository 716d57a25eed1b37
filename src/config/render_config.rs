//! Chart rendering configuration parsed from environment variables.
//!
//! Values can be overridden by a TOML file passed with `--config`, and the binaries
//! apply their own CLI flags last.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const DEFAULT_DPI: u32 = 100;
const MIN_DPI: u32 = 10;
const MAX_DPI: u32 = 600;

/// Output format for static charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => anyhow::bail!("Invalid image format: {}. Must be 'png' or 'svg'", s),
        }
    }
}

/// Rendering environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEnvConfig {
    pub dpi: u32,
    pub font_family: String,
    pub image_format: ImageFormat,
    /// Render independent chart files on the rayon pool
    pub parallel: bool,
    pub plotly_js_url: String,
}

impl Default for RenderEnvConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            font_family: "sans-serif".to_string(),
            image_format: ImageFormat::Png,
            parallel: true,
            plotly_js_url: DEFAULT_PLOTLY_JS_URL.to_string(),
        }
    }
}

/// Partial settings read from a TOML file; absent keys keep the current value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOverrides {
    pub dpi: Option<u32>,
    pub font_family: Option<String>,
    pub image_format: Option<ImageFormat>,
    pub parallel: Option<bool>,
    pub plotly_js_url: Option<String>,
}

impl RenderEnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparseable or out-of-range
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let dpi = lookup("VIZ_DPI")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|dpi| (MIN_DPI..=MAX_DPI).contains(dpi))
            .unwrap_or(defaults.dpi);

        let font_family = lookup("VIZ_FONT_FAMILY")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.font_family);

        let image_format = lookup("VIZ_IMAGE_FORMAT")
            .and_then(|v| ImageFormat::from_str(&v).ok())
            .unwrap_or(defaults.image_format);

        let parallel = lookup("VIZ_PARALLEL")
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(defaults.parallel);

        let plotly_js_url = lookup("VIZ_PLOTLY_JS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.plotly_js_url);

        Self {
            dpi,
            font_family,
            image_format,
            parallel,
            plotly_js_url,
        }
    }

    pub fn apply(&mut self, overrides: RenderOverrides) {
        if let Some(dpi) = overrides.dpi.filter(|dpi| (MIN_DPI..=MAX_DPI).contains(dpi)) {
            self.dpi = dpi;
        }
        if let Some(font_family) = overrides.font_family {
            self.font_family = font_family;
        }
        if let Some(image_format) = overrides.image_format {
            self.image_format = image_format;
        }
        if let Some(parallel) = overrides.parallel {
            self.parallel = parallel;
        }
        if let Some(url) = overrides.plotly_js_url {
            self.plotly_js_url = url;
        }
    }

    /// Applies overrides from a TOML file.
    pub fn apply_toml_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read render config file: {}", path.display()))?;
        let overrides: RenderOverrides = toml::from_str(&content)
            .context(format!("Failed to parse render config TOML: {}", path.display()))?;
        self.apply(overrides);
        Ok(())
    }
}
