//! Inbound ports (API) for the Flood Broadcast subsystem.

use shared_types::{GossipValue, NeighborEntry, NodeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{BroadcastMetrics, DeliveryOutcome, NeighborSource, Origin};
use crate::events::BroadcastError;

/// Primary API for flood broadcast.
///
/// One method per inbound message type. Implementations must tolerate
/// concurrent calls from independent tasks.
pub trait BroadcastApi: Send + Sync {
    /// Value type disseminated by this service.
    type Value: GossipValue;

    /// Handle an inbound `broadcast`.
    ///
    /// Replies `broadcast_ok` to `origin` first, then deduplicates. Only a
    /// first-seen value is forwarded, to every neighbor except `origin.src`.
    ///
    /// # Errors
    /// `SendFailed` if the acknowledgement or any forward fails; forwards
    /// already issued are not rolled back.
    fn handle_broadcast(
        &self,
        origin: &Origin,
        value: Self::Value,
    ) -> Result<DeliveryOutcome, BroadcastError>;

    /// Absorb a `broadcast_ok` from a peer. No state change.
    fn handle_broadcast_ok(&self, origin: &Origin) -> Result<(), BroadcastError>;

    /// Reply `read_ok` with every value seen so far.
    ///
    /// # Returns
    /// Number of values in the reply.
    fn handle_read(&self, origin: &Origin) -> Result<usize, BroadcastError>;

    /// Install this node's neighbor set from a topology assignment, then
    /// reply `topology_ok`.
    fn handle_topology(
        &self,
        origin: &Origin,
        topology: &HashMap<NodeId, NeighborEntry>,
    ) -> Result<NeighborSource, BroadcastError>;

    /// Snapshot of the seen-store.
    fn seen_values(&self) -> Vec<Self::Value>;

    /// Number of distinct values seen so far.
    fn seen_count(&self) -> usize {
        self.seen_values().len()
    }

    /// Currently installed neighbor set.
    fn neighbors(&self) -> Arc<Vec<NodeId>>;

    /// Service counters.
    fn get_metrics(&self) -> BroadcastMetrics;
}
