//! # In-Memory Cluster
//!
//! A deterministic network of `BroadcastService` nodes. Outbound messages go
//! into one shared queue; [`InMemoryCluster::pump`] delivers them until the
//! network is quiet. Delivery goes through the same handler registration
//! path the real runtime uses: each envelope is re-encoded to JSON and passed
//! to the handler registered for its type.
//!
//! Messages addressed to client ids (`c...`) are kept in a client inbox.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flood_broadcast::{
    register_handlers, BroadcastApi, BroadcastConfig, BroadcastError, BroadcastService, Handler,
    HandlerOutcome, HandlerRegistrar, Origin, Transport,
};
use parking_lot::Mutex;
use rand::Rng;
use shared_types::{Body, Envelope, MessageId, MessageKind, NeighborEntry, NodeId, Payload, RawEnvelope};

/// Typed message in flight.
pub type Message = Envelope<Body<i64>>;

/// Service type running on every cluster node.
pub type ClusterService = BroadcastService<i64, ClusterTransport>;

/// Shared medium between all nodes.
#[derive(Default)]
struct Network {
    queue: Mutex<VecDeque<Message>>,
    client_inbox: Mutex<Vec<Message>>,
    /// Every node-to-node `broadcast` ever delivered, as (src, dest, value).
    gossip_log: Mutex<Vec<(NodeId, NodeId, i64)>>,
    failures: Mutex<Vec<BroadcastError>>,
    next_msg_id: AtomicU64,
}

impl Network {
    fn push(&self, src: NodeId, dest: NodeId, body: Body<i64>) {
        self.queue.lock().push_back(Envelope { src, dest, body });
    }

    fn fresh_msg_id(&self) -> MessageId {
        self.next_msg_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Transport handed to each node's service.
pub struct ClusterTransport {
    id: NodeId,
    members: Vec<NodeId>,
    network: Arc<Network>,
}

impl Transport<i64> for ClusterTransport {
    fn identity(&self) -> NodeId {
        self.id.clone()
    }

    fn peers(&self) -> Vec<NodeId> {
        self.members.clone()
    }

    fn send(&self, dest: &NodeId, payload: Payload<i64>) -> Result<(), BroadcastError> {
        let body = Body::new(payload).with_msg_id(self.network.fresh_msg_id());
        self.network.push(self.id.clone(), dest.clone(), body);
        Ok(())
    }

    fn reply(&self, origin: &Origin, payload: Payload<i64>) -> Result<(), BroadcastError> {
        let body = Body::new(payload)
            .with_msg_id(self.network.fresh_msg_id())
            .in_reply_to(origin.msg_id);
        self.network.push(self.id.clone(), origin.src.clone(), body);
        Ok(())
    }
}

/// One node: its service plus the handlers it registered.
pub struct ClusterNode {
    service: Arc<ClusterService>,
    handlers: HashMap<MessageKind, Handler>,
}

impl HandlerRegistrar for ClusterNode {
    fn register_handler(&mut self, kind: MessageKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }
}

impl ClusterNode {
    pub fn service(&self) -> &Arc<ClusterService> {
        &self.service
    }
}

/// A set of nodes sharing one in-memory network.
pub struct InMemoryCluster {
    nodes: BTreeMap<NodeId, ClusterNode>,
    network: Arc<Network>,
}

impl InMemoryCluster {
    /// Cluster of `size` nodes named `n1..=n{size}`, no topology installed.
    pub fn new(size: usize) -> Self {
        let ids: Vec<NodeId> = (1..=size).map(|i| NodeId::new(format!("n{}", i))).collect();
        let network = Arc::new(Network::default());

        let nodes = ids
            .iter()
            .map(|id| {
                let transport = Arc::new(ClusterTransport {
                    id: id.clone(),
                    members: ids.clone(),
                    network: Arc::clone(&network),
                });
                let service = Arc::new(BroadcastService::new(BroadcastConfig::default(), transport));
                let mut node = ClusterNode {
                    service: Arc::clone(&service),
                    handlers: HashMap::new(),
                };
                register_handlers(service, &mut node);
                (id.clone(), node)
            })
            .collect();

        Self { nodes, network }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    /// # Panics
    /// If `id` is not a cluster member.
    pub fn node(&self, id: &str) -> &ClusterNode {
        self.nodes
            .get(id)
            .unwrap_or_else(|| panic!("no node {} in cluster", id))
    }

    pub fn service(&self, id: &str) -> Arc<ClusterService> {
        Arc::clone(self.node(id).service())
    }

    /// Seen-store of `id`, ordered.
    pub fn seen(&self, id: &str) -> BTreeSet<i64> {
        self.node(id).service().seen_values().into_iter().collect()
    }

    /// Queue a request from outside the cluster.
    pub fn submit(&self, src: &str, dest: &str, payload: Payload<i64>) -> MessageId {
        let msg_id = self.network.fresh_msg_id();
        self.network
            .push(NodeId::from(src), NodeId::from(dest), Body::new(payload).with_msg_id(msg_id));
        msg_id
    }

    pub fn client_broadcast(&self, client: &str, dest: &str, value: i64) -> MessageId {
        self.submit(client, dest, Payload::Broadcast { message: value })
    }

    pub fn client_read(&self, client: &str, dest: &str) -> MessageId {
        self.submit(client, dest, Payload::Read)
    }

    /// Send a `topology` request to every node, then pump.
    ///
    /// Nodes missing from `assignment` fall back to every other node.
    pub fn set_topology(&self, assignment: &HashMap<NodeId, Vec<NodeId>>) {
        let topology: HashMap<NodeId, NeighborEntry> = assignment
            .iter()
            .map(|(node, neighbors)| (node.clone(), NeighborEntry::from(neighbors.clone())))
            .collect();
        for id in self.nodes.keys() {
            self.submit(
                "c0",
                id.as_str(),
                Payload::Topology {
                    topology: topology.clone(),
                },
            );
        }
        self.pump();
    }

    /// Deliver queued messages in FIFO order until the network is quiet.
    ///
    /// # Returns
    /// Number of messages delivered to nodes.
    pub fn pump(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.network.queue.lock().pop_front();
            match next {
                Some(message) => delivered += self.route(message),
                None => return delivered,
            }
        }
    }

    /// Deliver queued messages in random order until the network is quiet.
    pub fn pump_random<R: Rng>(&self, rng: &mut R) -> usize {
        let mut delivered = 0;
        loop {
            let next = {
                let mut queue = self.network.queue.lock();
                if queue.is_empty() {
                    None
                } else {
                    let index = rng.gen_range(0..queue.len());
                    queue.remove(index)
                }
            };
            match next {
                Some(message) => delivered += self.route(message),
                None => return delivered,
            }
        }
    }

    /// Deliver one message directly to its destination node.
    pub fn deliver(&self, message: &Message) -> Result<HandlerOutcome, BroadcastError> {
        let node = self.node(message.dest.as_str());
        let kind = message.body.payload.kind();
        let raw = RawEnvelope {
            src: message.src.clone(),
            dest: message.dest.clone(),
            body: serde_json::to_value(&message.body).map_err(|e| {
                BroadcastError::MalformedInput {
                    kind: kind.to_string(),
                    reason: e.to_string(),
                }
            })?,
        };
        let handler = node
            .handlers
            .get(&kind)
            .ok_or_else(|| BroadcastError::Unsupported(kind.to_string()))?;
        handler(raw)
    }

    fn route(&self, message: Message) -> usize {
        if message.dest.is_client() || !self.nodes.contains_key(&message.dest) {
            self.network.client_inbox.lock().push(message);
            return 0;
        }

        if let Payload::Broadcast { message: value } = &message.body.payload {
            if !message.src.is_client() {
                self.network
                    .gossip_log
                    .lock()
                    .push((message.src.clone(), message.dest.clone(), *value));
            }
        }

        if let Err(e) = self.deliver(&message) {
            self.network.failures.lock().push(e);
        }
        1
    }

    /// Replies received by `client`, in arrival order.
    pub fn client_replies(&self, client: &str) -> Vec<Message> {
        self.network
            .client_inbox
            .lock()
            .iter()
            .filter(|m| m.dest.as_str() == client)
            .cloned()
            .collect()
    }

    /// The `read_ok` reply correlated with `request`, sorted.
    pub fn read_result(&self, client: &str, request: MessageId) -> Option<Vec<i64>> {
        self.client_replies(client)
            .into_iter()
            .find(|m| m.body.in_reply_to == Some(request))
            .and_then(|m| match m.body.payload {
                Payload::ReadOk { mut messages } => {
                    messages.sort_unstable();
                    Some(messages)
                }
                _ => None,
            })
    }

    /// Node-to-node broadcasts delivered so far.
    pub fn gossip_log(&self) -> Vec<(NodeId, NodeId, i64)> {
        self.network.gossip_log.lock().clone()
    }

    /// Handler errors observed while pumping.
    pub fn failures(&self) -> Vec<BroadcastError> {
        self.network.failures.lock().clone()
    }
}

/// `{node: [neighbors]}` from string pairs.
pub fn topology(entries: &[(&str, &[&str])]) -> HashMap<NodeId, Vec<NodeId>> {
    entries
        .iter()
        .map(|(node, neighbors)| {
            (
                NodeId::from(*node),
                neighbors.iter().map(|n| NodeId::from(*n)).collect(),
            )
        })
        .collect()
}

/// Ring over `ids`: each node neighbors its predecessor and successor.
pub fn ring(ids: &[NodeId]) -> HashMap<NodeId, Vec<NodeId>> {
    let n = ids.len();
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let mut neighbors = vec![ids[(i + n - 1) % n].clone(), ids[(i + 1) % n].clone()];
            neighbors.dedup();
            neighbors.retain(|x| x != id);
            (id.clone(), neighbors)
        })
        .collect()
}

/// Random connected undirected topology: a random spanning tree plus
/// `extra_edges` random chords.
pub fn random_connected<R: Rng>(
    ids: &[NodeId],
    extra_edges: usize,
    rng: &mut R,
) -> HashMap<NodeId, Vec<NodeId>> {
    let mut adjacency: HashMap<NodeId, BTreeSet<NodeId>> =
        ids.iter().map(|id| (id.clone(), BTreeSet::new())).collect();
    let mut link = |a: &NodeId, b: &NodeId| {
        if a != b {
            adjacency.entry(a.clone()).or_default().insert(b.clone());
            adjacency.entry(b.clone()).or_default().insert(a.clone());
        }
    };

    for i in 1..ids.len() {
        let parent = rng.gen_range(0..i);
        link(&ids[i], &ids[parent]);
    }
    if ids.len() > 1 {
        for _ in 0..extra_edges {
            let a = rng.gen_range(0..ids.len());
            let b = rng.gen_range(0..ids.len());
            link(&ids[a], &ids[b]);
        }
    }

    adjacency
        .into_iter()
        .map(|(id, neighbors)| (id, neighbors.into_iter().collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ring_neighbors() {
        let cluster = InMemoryCluster::new(4);
        let ring = ring(&cluster.node_ids());
        assert_eq!(ring[&NodeId::from("n1")], vec![NodeId::from("n4"), NodeId::from("n2")]);
        assert_eq!(ring[&NodeId::from("n3")], vec![NodeId::from("n2"), NodeId::from("n4")]);
    }

    #[test]
    fn test_ring_of_two_has_single_neighbor() {
        let ids = vec![NodeId::from("n1"), NodeId::from("n2")];
        assert_eq!(ring(&ids)[&NodeId::from("n1")], vec![NodeId::from("n2")]);
    }

    #[test]
    fn test_random_topology_is_symmetric_and_self_free() {
        let ids: Vec<NodeId> = (1..=12).map(|i| NodeId::new(format!("n{}", i))).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let topology = random_connected(&ids, 6, &mut rng);

        for (node, neighbors) in &topology {
            assert!(!neighbors.contains(node));
            for neighbor in neighbors {
                assert!(topology[neighbor].contains(node), "{} -> {} not mirrored", node, neighbor);
            }
        }
    }

    #[test]
    fn test_replies_reach_client_inbox() {
        let cluster = InMemoryCluster::new(1);
        let request = cluster.client_read("c9", "n1");
        cluster.pump();

        assert_eq!(cluster.read_result("c9", request), Some(vec![]));
        assert!(cluster.failures().is_empty());
    }
}
