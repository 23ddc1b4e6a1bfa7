//! # Flood Telemetry
//!
//! Logging and metrics for flood gossip nodes.
//!
//! ## Components
//!
//! - **Logs**: `tracing` records on stderr, plain text or JSON
//! - **Metrics**: Prometheus counters, gauges and histograms in a process
//!   registry, rendered as text on demand
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flood_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let telemetry = init_telemetry(&TelemetryConfig::from_env())?;
//!     // ... run the node ...
//!     eprintln!("{}", telemetry.metrics().gather_text()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FLOOD_SERVICE_NAME` | `flood-node` | Service name in log records |
//! | `FLOOD_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `FLOOD_JSON_LOGS` | `false` | JSON log lines |
//! | `FLOOD_LOG_ANSI` | `false` | Colored plain-text logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    register_metrics, HistogramTimer, MetricsHandle, BROADCASTS_RECEIVED, DUPLICATES_SUPPRESSED,
    GOSSIP_SENDS, HANDLER_DURATION, HANDLER_ERRORS, READS_SERVED, SEEN_VALUES,
    TOPOLOGY_INSTALLS, VALUES_FIRST_SEEN,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the global log subscriber.
///
/// Returns a guard holding the metrics handle. Keep it for the lifetime of
/// the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "Shutting down telemetry");
    }
}
