//! # JSON-Lines Transport
//!
//! Implements the broadcast core's [`Transport`] port over a line-oriented
//! writer (stdout in production, an in-memory buffer in tests).
//!
//! ## Rules
//!
//! - Identity and membership are fixed once by `init`.
//! - Every outbound request gets a fresh `msg_id` starting at 1.
//! - Replies carry `in_reply_to` and go to the request's sender.
//! - One line per message, written and flushed under a lock, so concurrent
//!   handlers never interleave output.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use flood_broadcast::{BroadcastError, Origin, Transport};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use shared_types::{Body, Envelope, ErrorCode, GossipValue, MessageId, NodeId, Payload};
use tracing::trace;

use crate::errors::RuntimeError;

/// Identity and peers assigned by `init`.
#[derive(Debug, Clone)]
struct Membership {
    node_id: NodeId,
    node_ids: Vec<NodeId>,
}

/// Transport writing one JSON envelope per line.
pub struct StdioTransport {
    membership: RwLock<Option<Membership>>,
    next_msg_id: AtomicU64,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StdioTransport {
    /// Transport over the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            membership: RwLock::new(None),
            next_msg_id: AtomicU64::new(1),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Fix this node's identity and the cluster membership.
    ///
    /// # Errors
    /// `AlreadyInitialized` on any call after the first.
    pub fn init(&self, node_id: NodeId, node_ids: Vec<NodeId>) -> Result<(), RuntimeError> {
        let mut membership = self.membership.write();
        if let Some(existing) = membership.as_ref() {
            return Err(RuntimeError::AlreadyInitialized(existing.node_id.to_string()));
        }
        *membership = Some(Membership { node_id, node_ids });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.membership.read().is_some()
    }

    /// Reply with an error body.
    ///
    /// `local` addresses the reply when identity is not known yet.
    pub fn reply_error(
        &self,
        local: &NodeId,
        origin: &Origin,
        code: ErrorCode,
        text: impl Into<String>,
    ) -> Result<(), BroadcastError> {
        let src = self.identity_or(local);
        let body = Body::new(Payload::<serde_json::Value>::error(code, text))
            .in_reply_to(origin.msg_id);
        self.emit(src, origin.src.clone(), body)
    }

    /// Reply `init_ok` to the init request.
    pub fn reply_init_ok(&self, origin: &Origin) -> Result<(), BroadcastError> {
        let body = Body::new(Payload::<serde_json::Value>::InitOk)
            .with_msg_id(self.fresh_msg_id())
            .in_reply_to(origin.msg_id);
        self.emit(self.identity_or(&NodeId::default()), origin.src.clone(), body)
    }

    fn identity_or(&self, fallback: &NodeId) -> NodeId {
        self.membership
            .read()
            .as_ref()
            .map(|m| m.node_id.clone())
            .unwrap_or_else(|| fallback.clone())
    }

    fn fresh_msg_id(&self) -> MessageId {
        self.next_msg_id.fetch_add(1, Ordering::Relaxed)
    }

    fn emit<V: Serialize>(&self, src: NodeId, dest: NodeId, body: Body<V>) -> Result<(), BroadcastError> {
        let envelope = Envelope { src, dest, body };
        let line = envelope.to_line().map_err(|e| BroadcastError::SendFailed {
            destination: envelope.dest.clone(),
            reason: e.to_string(),
        })?;

        write_line(&mut **self.writer.lock(), &line).map_err(|e| BroadcastError::SendFailed {
            destination: envelope.dest.clone(),
            reason: e.to_string(),
        })?;

        trace!("[runtime] -> {}", line);
        Ok(())
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

impl<V: GossipValue> Transport<V> for StdioTransport {
    fn identity(&self) -> NodeId {
        self.identity_or(&NodeId::default())
    }

    fn peers(&self) -> Vec<NodeId> {
        self.membership
            .read()
            .as_ref()
            .map(|m| m.node_ids.clone())
            .unwrap_or_default()
    }

    fn send(&self, dest: &NodeId, payload: Payload<V>) -> Result<(), BroadcastError> {
        let body = Body::new(payload).with_msg_id(self.fresh_msg_id());
        self.emit(Transport::<V>::identity(self), dest.clone(), body)
    }

    fn reply(&self, origin: &Origin, payload: Payload<V>) -> Result<(), BroadcastError> {
        let body = Body::new(payload)
            .with_msg_id(self.fresh_msg_id())
            .in_reply_to(origin.msg_id);
        self.emit(Transport::<V>::identity(self), origin.src.clone(), body)
    }
}
