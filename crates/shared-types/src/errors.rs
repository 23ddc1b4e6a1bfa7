//! # Error Types
//!
//! Defines the protocol error codes carried by `error` bodies and the codec
//! errors raised while framing and decoding messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numeric error code carried in an `error` reply body.
///
/// Codes follow the Maelstrom workbench numbering so that test harnesses can
/// classify failures as definite or indefinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// The requested operation timed out.
    pub const TIMEOUT: ErrorCode = ErrorCode(0);
    /// The destination node does not exist.
    pub const NODE_NOT_FOUND: ErrorCode = ErrorCode(1);
    /// The message type is not handled by this node.
    pub const NOT_SUPPORTED: ErrorCode = ErrorCode(10);
    /// The node cannot serve the request right now (e.g. before `init`).
    pub const TEMPORARILY_UNAVAILABLE: ErrorCode = ErrorCode(11);
    /// The request body did not match the shape expected for its type.
    pub const MALFORMED_REQUEST: ErrorCode = ErrorCode(12);
    /// The node crashed while handling the request.
    pub const CRASH: ErrorCode = ErrorCode(13);
    /// A precondition of the request was not met.
    pub const PRECONDITION_FAILED: ErrorCode = ErrorCode(22);

    /// Definite errors guarantee the request had no effect.
    pub fn is_definite(&self) -> bool {
        !matches!(*self, ErrorCode::TIMEOUT | ErrorCode::CRASH)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            ErrorCode::TIMEOUT => "timeout",
            ErrorCode::NODE_NOT_FOUND => "node-not-found",
            ErrorCode::NOT_SUPPORTED => "not-supported",
            ErrorCode::TEMPORARILY_UNAVAILABLE => "temporarily-unavailable",
            ErrorCode::MALFORMED_REQUEST => "malformed-request",
            ErrorCode::CRASH => "crash",
            ErrorCode::PRECONDITION_FAILED => "precondition-failed",
            _ => return write!(f, "error-{}", self.0),
        };
        write!(f, "{} ({})", name, self.0)
    }
}

/// Errors raised while framing or decoding messages.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The line is not a JSON envelope with `src`, `dest` and `body`.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The body has no string `type` field.
    #[error("Body has no message type")]
    MissingType,

    /// The body does not match the shape expected for its type.
    #[error("Malformed {kind} body: {reason}")]
    MalformedBody { kind: String, reason: String },

    /// A message could not be serialized.
    #[error("Encode failed: {0}")]
    Encode(String),
}
