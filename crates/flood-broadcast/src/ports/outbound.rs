//! Outbound ports (SPI) for the Flood Broadcast subsystem.
//!
//! The message transport is an external collaborator: it owns identity
//! assignment, membership, framing and delivery. The core only needs the
//! primitives below.

use shared_types::{MessageKind, NodeId, Payload, RawEnvelope};

use crate::domain::{HandlerOutcome, Origin};
use crate::events::BroadcastError;

/// Message transport used by the core.
pub trait Transport<V>: Send + Sync {
    /// This node's identifier.
    fn identity(&self) -> NodeId;

    /// Every known node in the cluster (may include this node).
    fn peers(&self) -> Vec<NodeId>;

    /// Best-effort send to a peer.
    ///
    /// # Errors
    /// `SendFailed` if the message could not be handed to the network.
    fn send(&self, dest: &NodeId, payload: Payload<V>) -> Result<(), BroadcastError>;

    /// Correlated reply to the sender of a request.
    fn reply(&self, origin: &Origin, payload: Payload<V>) -> Result<(), BroadcastError>;
}

/// Callback bound to one message type. Receives the undecoded envelope.
pub type Handler = Box<dyn Fn(RawEnvelope) -> Result<HandlerOutcome, BroadcastError> + Send + Sync>;

/// Handler registration mechanism offered by the transport.
pub trait HandlerRegistrar {
    /// Bind `handler` to `kind`, replacing any previous binding.
    fn register_handler(&mut self, kind: MessageKind, handler: Handler);
}
