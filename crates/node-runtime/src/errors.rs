//! Runtime errors.

use flood_broadcast::BroadcastError;
use shared_types::CodecError;
use thiserror::Error;

use crate::container::ConfigError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A second `init` arrived.
    #[error("Node already initialized as {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    /// Reading the input stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-flight limiter was closed while the loop was running.
    #[error("Task limiter closed")]
    LimiterClosed,
}
