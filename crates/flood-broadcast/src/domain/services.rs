//! Domain services for flood broadcast.
//!
//! Pure functions for neighbor resolution and gossip target selection.

use shared_types::{NeighborEntry, NodeId};
use std::collections::HashMap;

use super::NeighborSource;

/// Resolve this node's neighbor set from a topology assignment.
///
/// A well-formed entry for `self_id` is taken as supplied. A missing or
/// malformed entry falls back to every other known node, so the node stays
/// reachable under an incomplete assignment. `peers` is only called on
/// fallback.
pub fn resolve_neighbors<F>(
    topology: &HashMap<NodeId, NeighborEntry>,
    self_id: &NodeId,
    peers: F,
) -> (Vec<NodeId>, NeighborSource)
where
    F: FnOnce() -> Vec<NodeId>,
{
    match topology.get(self_id).and_then(NeighborEntry::as_list) {
        Some(neighbors) => (neighbors.to_vec(), NeighborSource::Assigned),
        None => {
            let others = peers().into_iter().filter(|id| id != self_id).collect();
            (others, NeighborSource::Fallback)
        }
    }
}

/// Select the neighbors a value is forwarded to: everyone but `exclude`.
pub fn gossip_targets<'a>(neighbors: &'a [NodeId], exclude: &NodeId) -> Vec<&'a NodeId> {
    neighbors.iter().filter(|id| *id != exclude).collect()
}
