//! # Node Configuration
//!
//! Unified configuration for the node: telemetry, the broadcast core and the
//! runtime loop.
//!
//! All values have defaults; environment variables override them.

use std::env;
use std::str::FromStr;

use flood_broadcast::BroadcastConfig;
use flood_telemetry::TelemetryConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// Broadcast core configuration.
    pub broadcast: BroadcastConfig,
    /// Runtime loop configuration.
    pub runtime: RuntimeConfig,
}

/// Runtime loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum handler tasks executing at once.
    pub max_in_flight: u32,
    /// Log the Prometheus text dump when the input stream ends.
    pub metrics_on_exit: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 256,
            metrics_on_exit: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds an unparsable value.
    #[error("{var}={value:?} is not a valid value")]
    InvalidValue { var: &'static str, value: String },

    /// No handler could ever run.
    #[error("FLOOD_MAX_IN_FLIGHT must be at least 1")]
    ZeroInFlight,
}

impl NodeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `FLOOD_SEEN_CAPACITY`: initial seen-store allocation (default: 1024)
    /// - `FLOOD_MAX_IN_FLIGHT`: concurrent handler tasks (default: 256)
    /// - `FLOOD_METRICS_ON_EXIT`: log metrics at shutdown (default: true)
    /// - plus the telemetry variables read by [`TelemetryConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = NodeConfig {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..NodeConfig::default()
        };

        if let Some(capacity) = parse_var(&lookup, "FLOOD_SEEN_CAPACITY")? {
            config.broadcast.seen_capacity = capacity;
        }
        if let Some(max) = parse_var(&lookup, "FLOOD_MAX_IN_FLIGHT")? {
            config.runtime.max_in_flight = max;
        }
        if let Some(raw) = lookup("FLOOD_METRICS_ON_EXIT") {
            config.runtime.metrics_on_exit = parse_flag("FLOOD_METRICS_ON_EXIT", raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.max_in_flight == 0 {
            return Err(ConfigError::ZeroInFlight);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}

fn parse_flag(var: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { var, value: raw }),
    }
}
