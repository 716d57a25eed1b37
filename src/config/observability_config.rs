//! Logging configuration parsing from environment variables.

use std::env;

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    /// Emit structured JSON log lines instead of the pretty console format
    pub json_logs: bool,
    /// Default level when RUST_LOG does not say otherwise
    pub log_level: String,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            log_level: "info".to_string(),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json_logs: lookup("VIZ_LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            log_level: lookup("VIZ_LOG_LEVEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(|_| None);
        assert!(!config.json_logs);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_json_log_format() {
        let config = ObservabilityEnvConfig::from_lookup(|key| match key {
            "VIZ_LOG_FORMAT" => Some("JSON".to_string()),
            "VIZ_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert!(config.json_logs);
        assert_eq!(config.log_level, "debug");
    }
}
