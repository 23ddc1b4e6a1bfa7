//! Value objects for flood broadcast configuration and state.

use parking_lot::{Mutex, RwLock};
use shared_types::{GossipValue, NodeId};
use std::collections::HashSet;
use std::sync::Arc;

use super::ValueState;

/// Flood broadcast configuration.
#[derive(Clone, Debug)]
pub struct BroadcastConfig {
    /// Initial allocation for the seen-store. Capacity hint only; the store
    /// never evicts.
    pub seen_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            seen_capacity: 1024,
        }
    }
}

/// Deduplication set of every value this node has observed.
///
/// Insert-only. [`SeenStore::observe`] is the single test-and-set critical
/// section: of any number of concurrent deliveries of one new value, exactly
/// one observes it as new.
pub struct SeenStore<V: GossipValue> {
    values: Mutex<HashSet<V>>,
}

impl<V: GossipValue> SeenStore<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }

    /// Record a value. Returns `true` only on first sight.
    pub fn observe(&self, value: V) -> bool {
        self.values.lock().insert(value)
    }

    pub fn contains(&self, value: &V) -> bool {
        self.values.lock().contains(value)
    }

    pub fn state(&self, value: &V) -> ValueState {
        if self.contains(value) {
            ValueState::Seen
        } else {
            ValueState::Unseen
        }
    }

    /// Copy of the current contents, in no particular order.
    pub fn snapshot(&self) -> Vec<V> {
        self.values.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

/// This node's current neighbor set.
///
/// Installs replace the whole list with a pointer swap; readers hold an `Arc`
/// to the list that was current when they looked, never a partial one.
pub struct TopologyStore {
    neighbors: RwLock<Arc<Vec<NodeId>>>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self {
            neighbors: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Replace the neighbor set.
    pub fn install(&self, neighbors: Vec<NodeId>) {
        *self.neighbors.write() = Arc::new(neighbors);
    }

    pub fn current(&self) -> Arc<Vec<NodeId>> {
        self.neighbors.read().clone()
    }
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Service-level counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastMetrics {
    pub broadcasts_received: u64,
    pub values_first_seen: u64,
    pub duplicates_suppressed: u64,
    pub gossip_sends: u64,
    pub reads_served: u64,
    pub topology_installs: u64,
}
