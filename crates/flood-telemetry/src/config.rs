//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log records
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `flood_broadcast=debug,info`
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether ANSI colors are used in plain-text logs
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "flood-node".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FLOOD_SERVICE_NAME`: Service name (default: flood-node)
    /// - `FLOOD_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `FLOOD_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `FLOOD_LOG_ANSI`: Colorize plain-text logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            service_name: lookup("FLOOD_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("FLOOD_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("FLOOD_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.json_logs),

            ansi: lookup("FLOOD_LOG_ANSI")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.ansi),
        }
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
