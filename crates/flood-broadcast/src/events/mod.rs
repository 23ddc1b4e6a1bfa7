//! Error types for the Flood Broadcast subsystem.

use shared_types::{CodecError, ErrorCode, NodeId};
use thiserror::Error;

/// Flood broadcast errors.
#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// The inbound body does not match the shape expected for its type.
    /// Raised before any state mutation or acknowledgement.
    #[error("Malformed {kind} request: {reason}")]
    MalformedInput { kind: String, reason: String },

    /// The transport failed to deliver a send or a reply.
    #[error("Send to {destination} failed: {reason}")]
    SendFailed { destination: NodeId, reason: String },

    /// No handler is registered for this message type.
    #[error("Unsupported message type: {0}")]
    Unsupported(String),
}

impl BroadcastError {
    /// Protocol error code describing this failure to a remote sender.
    pub fn code(&self) -> ErrorCode {
        match self {
            BroadcastError::MalformedInput { .. } => ErrorCode::MALFORMED_REQUEST,
            BroadcastError::SendFailed { .. } => ErrorCode::CRASH,
            BroadcastError::Unsupported(_) => ErrorCode::NOT_SUPPORTED,
        }
    }
}

impl From<CodecError> for BroadcastError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedBody { kind, reason } => {
                BroadcastError::MalformedInput { kind, reason }
            }
            other => BroadcastError::MalformedInput {
                kind: "unknown".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
