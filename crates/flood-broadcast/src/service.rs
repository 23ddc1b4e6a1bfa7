//! # Flood Broadcast Service
//!
//! The main service implementation for value dissemination by flooding.
//!
//! ## Architecture
//!
//! This service implements the inbound port [`BroadcastApi`] and depends on
//! one outbound port, [`Transport`], implemented by the node runtime (or by an
//! in-memory network in tests).
//!
//! ## Delivery Flow
//!
//! 1. Acknowledge (`broadcast_ok`) unconditionally
//! 2. Test-and-set in the seen-store
//! 3. First sight only: forward to every neighbor except the sender
//!
//! Step 2 is one critical section, so concurrent deliveries of the same new
//! value produce exactly one propagation burst.

use parking_lot::RwLock;
use shared_types::{GossipValue, NeighborEntry, NodeId, Payload};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    gossip_targets, invariant_duplicate_free, invariant_fallback_excludes_self,
    invariant_no_echo, resolve_neighbors, BroadcastConfig, BroadcastMetrics, DeliveryOutcome,
    NeighborSource, Origin, SeenStore, TopologyStore,
};
use crate::events::BroadcastError;
use crate::ports::inbound::BroadcastApi;
use crate::ports::outbound::Transport;

/// Flood Broadcast Service.
///
/// Owns the seen-store and the neighbor set for one node. Share it across
/// handler tasks with `Arc`; all state is internally synchronized.
///
/// ## Dependencies
///
/// - `T: Transport<V>` - identity, membership, send and reply
pub struct BroadcastService<V, T>
where
    V: GossipValue,
    T: Transport<V>,
{
    /// Service configuration.
    config: BroadcastConfig,
    /// Every value observed so far. Never shrinks.
    seen: SeenStore<V>,
    /// Current neighbor set.
    topology: TopologyStore,
    /// Message transport adapter.
    transport: Arc<T>,
    /// Counters for monitoring.
    metrics: RwLock<BroadcastMetrics>,
    _value: PhantomData<fn() -> V>,
}

impl<V, T> BroadcastService<V, T>
where
    V: GossipValue,
    T: Transport<V>,
{
    pub fn new(config: BroadcastConfig, transport: Arc<T>) -> Self {
        Self {
            seen: SeenStore::new(config.seen_capacity),
            topology: TopologyStore::new(),
            config,
            transport,
            metrics: RwLock::new(BroadcastMetrics::default()),
            _value: PhantomData,
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Gossip propagator: send `value` to every neighbor except `exclude`.
    ///
    /// Fail-fast: the first failed send aborts the burst. Sends already
    /// issued stay issued.
    ///
    /// # Returns
    /// Number of neighbors the value was sent to.
    pub fn propagate(&self, exclude: &NodeId, value: &V) -> Result<usize, BroadcastError> {
        let neighbors = self.topology.current();
        let targets = gossip_targets(&neighbors, exclude);
        debug_assert!(invariant_no_echo(&targets, exclude));

        let mut sent = 0;
        let result = targets.iter().try_for_each(|dest| {
            self.transport.send(
                dest,
                Payload::Broadcast {
                    message: value.clone(),
                },
            )?;
            sent += 1;
            Ok(())
        });

        self.metrics.write().gossip_sends += sent as u64;

        match result {
            Ok(()) => Ok(sent),
            Err(e) => {
                warn!(
                    "[flood] Propagation of {:?} aborted after {}/{} sends: {}",
                    value,
                    sent,
                    targets.len(),
                    e
                );
                Err(e)
            }
        }
    }
}

impl<V, T> BroadcastApi for BroadcastService<V, T>
where
    V: GossipValue,
    T: Transport<V>,
{
    type Value = V;

    fn handle_broadcast(&self, origin: &Origin, value: V) -> Result<DeliveryOutcome, BroadcastError> {
        self.metrics.write().broadcasts_received += 1;

        // Acknowledge before dedup: the sender's expectation is met either way
        self.transport.reply(origin, Payload::BroadcastOk)?;

        if !self.seen.observe(value.clone()) {
            self.metrics.write().duplicates_suppressed += 1;
            debug!("[flood] Duplicate {:?} from {} suppressed", value, origin.src);
            return Ok(DeliveryOutcome::Duplicate);
        }

        self.metrics.write().values_first_seen += 1;
        debug!("[flood] First sight of {:?} from {}", value, origin.src);

        let forwarded = self.propagate(&origin.src, &value)?;
        Ok(DeliveryOutcome::FirstSeen { forwarded })
    }

    fn handle_broadcast_ok(&self, origin: &Origin) -> Result<(), BroadcastError> {
        debug!("[flood] broadcast_ok from {}", origin.src);
        Ok(())
    }

    fn handle_read(&self, origin: &Origin) -> Result<usize, BroadcastError> {
        let messages = self.seen.snapshot();
        debug_assert!(invariant_duplicate_free(&messages));

        let count = messages.len();
        self.transport.reply(origin, Payload::ReadOk { messages })?;
        self.metrics.write().reads_served += 1;
        Ok(count)
    }

    fn handle_topology(
        &self,
        origin: &Origin,
        topology: &HashMap<NodeId, NeighborEntry>,
    ) -> Result<NeighborSource, BroadcastError> {
        let self_id = self.transport.identity();
        let (neighbors, source) = resolve_neighbors(topology, &self_id, || self.transport.peers());
        debug_assert!(
            source == NeighborSource::Assigned
                || invariant_fallback_excludes_self(&neighbors, &self_id)
        );

        info!(
            source = source.as_str(),
            neighbors = ?neighbors,
            "[flood] Installing topology for {}",
            self_id
        );
        self.topology.install(neighbors);
        self.metrics.write().topology_installs += 1;

        self.transport.reply(origin, Payload::TopologyOk)?;
        Ok(source)
    }

    fn seen_values(&self) -> Vec<V> {
        self.seen.snapshot()
    }

    fn seen_count(&self) -> usize {
        self.seen.len()
    }

    fn neighbors(&self) -> Arc<Vec<NodeId>> {
        self.topology.current()
    }

    fn get_metrics(&self) -> BroadcastMetrics {
        self.metrics.read().clone()
    }
}
