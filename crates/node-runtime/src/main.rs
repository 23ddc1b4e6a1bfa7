//! # Flood Node
//!
//! One node of a flood gossip cluster. Speaks JSON lines on stdin/stdout;
//! logs go to stderr.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Register metrics and install the log subscriber
//! 3. Build the broadcast service and register its handlers
//! 4. Read stdin until end of input (or Ctrl+C)
//! 5. Log the final metrics

use std::sync::Arc;

use anyhow::{Context, Result};
use flood_telemetry::init_telemetry;
use node_runtime::{NodeConfig, NodeRuntime, StdioTransport};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let telemetry = init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Flood Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        "[runtime] seen_capacity={} max_in_flight={}",
        config.broadcast.seen_capacity, config.runtime.max_in_flight
    );

    let runtime = NodeRuntime::new(&config, Arc::new(StdioTransport::stdout()))
        .context("Failed to build node runtime")?;

    tokio::select! {
        result = runtime.run(BufReader::new(tokio::io::stdin())) => {
            let summary = result.context("Runtime loop failed")?;
            info!("[runtime] Processed {} lines ({} dropped)", summary.lines, summary.dropped);
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("[runtime] Interrupted, exiting without draining");
        }
    }

    if config.runtime.metrics_on_exit {
        let text = telemetry
            .metrics()
            .gather_text()
            .context("Failed to render metrics")?;
        info!("[runtime] Final metrics:\n{}", text);
    }

    Ok(())
}
