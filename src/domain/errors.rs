use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading reports or producing charts
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Unsupported file format: {extension:?} (expected .json or .csv)")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No TimeSeries data found in {path}")]
    MissingTimeSeries { path: PathBuf },

    #[error("No {what} available")]
    EmptyData { what: String },

    #[error("Failed to render {path}: {reason}")]
    Render { path: PathBuf, reason: String },
}

impl VizError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VizError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn empty(what: &str) -> Self {
        VizError::EmptyData {
            what: what.to_string(),
        }
    }
}
