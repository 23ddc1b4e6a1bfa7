//! # Message Envelope
//!
//! The wrapper for every message exchanged between nodes and clients.
//!
//! ## Wire Shape
//!
//! ```text
//! {"src": "c1", "dest": "n1", "body": {"type": "broadcast", "msg_id": 3, "message": 42}}
//! ```
//!
//! - **Envelope**: `src`, `dest`, `body`.
//! - **Body headers**: `msg_id` (set on requests), `in_reply_to` (set on replies).
//! - **Payload**: the `type` tag plus the fields of that message kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::entities::{MessageId, NodeId};
use crate::errors::{CodecError, ErrorCode};

/// The universal message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<B> {
    /// Sender of the message. The ONLY source of truth for its identity.
    pub src: NodeId,
    /// Intended recipient.
    pub dest: NodeId,
    /// Message body.
    pub body: B,
}

/// Envelope whose body has not been decoded yet.
pub type RawEnvelope = Envelope<serde_json::Value>;

/// Message body: correlation headers plus the typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body<V> {
    /// Identifier of this message, unique per sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<MessageId>,
    /// For replies, the `msg_id` of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,
    #[serde(flatten)]
    pub payload: Payload<V>,
}

impl<V> Body<V> {
    pub fn new(payload: Payload<V>) -> Self {
        Self {
            msg_id: None,
            in_reply_to: None,
            payload,
        }
    }

    pub fn with_msg_id(mut self, msg_id: MessageId) -> Self {
        self.msg_id = Some(msg_id);
        self
    }

    pub fn in_reply_to(mut self, msg_id: Option<MessageId>) -> Self {
        self.in_reply_to = msg_id;
        self
    }
}

/// Closed set of message payloads, tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload<V> {
    /// Transport handshake: assigns identity and the cluster membership.
    Init {
        node_id: NodeId,
        node_ids: Vec<NodeId>,
    },
    InitOk,
    /// A value to disseminate.
    Broadcast { message: V },
    BroadcastOk,
    /// Snapshot read of every value observed so far.
    Read,
    ReadOk { messages: Vec<V> },
    /// Neighbor assignment for every node in the cluster.
    Topology {
        topology: HashMap<NodeId, NeighborEntry>,
    },
    TopologyOk,
    /// Error reply.
    Error {
        code: ErrorCode,
        #[serde(default)]
        text: String,
    },
}

impl<V> Payload<V> {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Init { .. } => MessageKind::Init,
            Payload::InitOk => MessageKind::InitOk,
            Payload::Broadcast { .. } => MessageKind::Broadcast,
            Payload::BroadcastOk => MessageKind::BroadcastOk,
            Payload::Read => MessageKind::Read,
            Payload::ReadOk { .. } => MessageKind::ReadOk,
            Payload::Topology { .. } => MessageKind::Topology,
            Payload::TopologyOk => MessageKind::TopologyOk,
            Payload::Error { .. } => MessageKind::Error,
        }
    }

    pub fn error(code: ErrorCode, text: impl Into<String>) -> Self {
        Payload::Error {
            code,
            text: text.into(),
        }
    }
}

/// One node's entry in a topology assignment.
///
/// Anything that is not a list of node ids is kept verbatim so the receiver
/// can tell "missing" from "present but malformed" and fall back either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NeighborEntry {
    List(Vec<NodeId>),
    Malformed(serde_json::Value),
}

impl NeighborEntry {
    pub fn as_list(&self) -> Option<&[NodeId]> {
        match self {
            NeighborEntry::List(ids) => Some(ids),
            NeighborEntry::Malformed(_) => None,
        }
    }
}

impl From<Vec<NodeId>> for NeighborEntry {
    fn from(ids: Vec<NodeId>) -> Self {
        NeighborEntry::List(ids)
    }
}

/// Message kinds, as spelled in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Init,
    InitOk,
    Broadcast,
    BroadcastOk,
    Read,
    ReadOk,
    Topology,
    TopologyOk,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Init => "init",
            MessageKind::InitOk => "init_ok",
            MessageKind::Broadcast => "broadcast",
            MessageKind::BroadcastOk => "broadcast_ok",
            MessageKind::Read => "read",
            MessageKind::ReadOk => "read_ok",
            MessageKind::Topology => "topology",
            MessageKind::TopologyOk => "topology_ok",
            MessageKind::Error => "error",
        }
    }

    /// Returns `None` for types outside the closed message set.
    pub fn parse(kind: &str) -> Option<Self> {
        let kind = match kind {
            "init" => MessageKind::Init,
            "init_ok" => MessageKind::InitOk,
            "broadcast" => MessageKind::Broadcast,
            "broadcast_ok" => MessageKind::BroadcastOk,
            "read" => MessageKind::Read,
            "read_ok" => MessageKind::ReadOk,
            "topology" => MessageKind::Topology,
            "topology_ok" => MessageKind::TopologyOk,
            "error" => MessageKind::Error,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RawEnvelope {
    /// Parse one line of the wire protocol.
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        serde_json::from_str(line).map_err(|e| CodecError::InvalidEnvelope(e.to_string()))
    }

    /// The body's `type` field, if it is a string.
    pub fn kind_str(&self) -> Result<&str, CodecError> {
        self.body
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(CodecError::MissingType)
    }

    pub fn msg_id(&self) -> Option<MessageId> {
        self.body.get("msg_id").and_then(serde_json::Value::as_u64)
    }

    /// Decode the body into a typed payload.
    pub fn decode<V: DeserializeOwned>(&self) -> Result<Envelope<Body<V>>, CodecError> {
        let body = serde_json::from_value(self.body.clone()).map_err(|e| {
            CodecError::MalformedBody {
                kind: self.kind_str().unwrap_or("unknown").to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Envelope {
            src: self.src.clone(),
            dest: self.dest.clone(),
            body,
        })
    }
}

impl<V: Serialize> Envelope<Body<V>> {
    /// Serialize as one line of the wire protocol (no trailing newline).
    pub fn to_line(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|e| CodecError::Encode(e.to_string()))
    }
}
