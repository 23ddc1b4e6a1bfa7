//! # Core Domain Entities
//!
//! Defines the identifiers and values that flow through the gossip protocol.
//!
//! ## Entities
//!
//! - [`NodeId`]: string-backed identifier of a cluster node or client
//! - [`MessageId`]: per-sender message counter used for request/response correlation
//! - [`Datum`]: the opaque application value carried by `broadcast`
//! - [`GossipValue`]: the bound every disseminated value type satisfies

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// Message identifier, unique per sender.
pub type MessageId = u64;

/// Unique identifier for a node (or client) in the cluster.
///
/// Serialized as a bare JSON string so it can also be used as an object key
/// (e.g. in topology maps).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maelstrom convention: client ids start with `c`, nodes with `n`.
    pub fn is_client(&self) -> bool {
        self.0.starts_with('c')
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque application value disseminated by the broadcast protocol.
///
/// Mirrors every JSON shape a client may send. Numbers keep their
/// `serde_json::Number` form, which hashes floats by bit pattern, so `1` and
/// `1.0` are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
}

impl Datum {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Number(v.into())
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_string())
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

/// Bound satisfied by every value type the gossip core can disseminate.
pub trait GossipValue:
    Clone + Eq + Hash + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> GossipValue for T where
    T: Clone + Eq + Hash + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
}
