//! Protocol invariants for flood broadcast.

use shared_types::NodeId;
use std::collections::HashSet;
use std::hash::Hash;

/// INVARIANT-1: No Echo
/// A propagation burst never targets the node the value arrived from.
pub fn invariant_no_echo(targets: &[&NodeId], source: &NodeId) -> bool {
    targets.iter().all(|target| *target != source)
}

/// INVARIANT-2: Fallback Excludes Self
/// A fallback neighbor set never contains this node.
pub fn invariant_fallback_excludes_self(neighbors: &[NodeId], self_id: &NodeId) -> bool {
    !neighbors.contains(self_id)
}

/// INVARIANT-3: Duplicate-Free Reads
/// A read result lists every value at most once.
pub fn invariant_duplicate_free<V: Eq + Hash>(values: &[V]) -> bool {
    let mut distinct = HashSet::with_capacity(values.len());
    values.iter().all(|value| distinct.insert(value))
}
