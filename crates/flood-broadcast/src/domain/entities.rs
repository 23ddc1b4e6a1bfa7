//! # Core Domain Entities
//!
//! Defines the fundamental data structures for flood broadcast.
//!
//! ## Entities
//!
//! - [`Origin`]: who sent a request and how to correlate the reply
//! - [`ValueState`]: per-value lifecycle (`Unseen` → `Seen`)
//! - [`DeliveryOutcome`]: what a `broadcast` delivery did
//! - [`NeighborSource`]: where an installed neighbor set came from
//! - [`HandlerOutcome`]: result of one handled inbound message

use shared_types::{Envelope, MessageId, NodeId};

/// The sender of an inbound request.
///
/// Carries exactly what the reply primitive needs: the address to answer and
/// the `msg_id` to put in `in_reply_to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    /// Immediate sender (client or peer).
    pub src: NodeId,
    /// Request identifier, if the sender expects a correlated reply.
    pub msg_id: Option<MessageId>,
}

impl Origin {
    pub fn new(src: impl Into<NodeId>, msg_id: Option<MessageId>) -> Self {
        Self {
            src: src.into(),
            msg_id,
        }
    }

    /// Build the origin of a decoded envelope.
    pub fn of<V>(envelope: &Envelope<shared_types::Body<V>>) -> Self {
        Self {
            src: envelope.src.clone(),
            msg_id: envelope.body.msg_id,
        }
    }
}

/// Lifecycle of one distinct value at one node.
///
/// `Seen` is absorbing: there is no expiry and no way back to `Unseen`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueState {
    /// Never delivered to this node.
    Unseen,
    /// Delivered at least once; its propagation burst has been triggered.
    Seen,
}

/// What a single `broadcast` delivery did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// First sight: inserted into the seen-store and forwarded.
    FirstSeen {
        /// Number of neighbors the value was sent to.
        forwarded: usize,
    },
    /// Already seen: acknowledged only.
    Duplicate,
}

impl DeliveryOutcome {
    pub fn is_first_seen(&self) -> bool {
        matches!(self, DeliveryOutcome::FirstSeen { .. })
    }
}

/// Where an installed neighbor set came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborSource {
    /// Taken from this node's entry in the topology assignment.
    Assigned,
    /// Entry missing or not a list: every other known node.
    Fallback,
}

impl NeighborSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeighborSource::Assigned => "assigned",
            NeighborSource::Fallback => "fallback",
        }
    }
}

/// Result of one handled inbound message, reported to the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A `broadcast` was acknowledged and deduplicated.
    Delivered(DeliveryOutcome),
    /// A `broadcast_ok` from a peer was absorbed.
    Acknowledged,
    /// A `read` was answered with this many values.
    ReadServed { values: usize },
    /// A `topology` was installed.
    TopologyInstalled { source: NeighborSource, neighbors: usize },
}
