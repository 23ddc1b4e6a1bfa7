//! # End-to-End Flood
//!
//! Three nodes, star topology around `n1`:
//!
//! ```text
//!  c1 ──→ n2 ──→ n1 ──→ n3
//! ```
//!
//! A client broadcasts to a leaf; the value must reach every node and every
//! read must return it.

#[cfg(test)]
mod tests {
    use crate::cluster::{topology, InMemoryCluster};
    use flood_broadcast::BroadcastApi;
    use shared_types::{NodeId, Payload};
    use std::collections::BTreeSet;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn star_cluster() -> InMemoryCluster {
        let cluster = InMemoryCluster::new(3);
        cluster.set_topology(&topology(&[
            ("n1", &["n2", "n3"]),
            ("n2", &["n1"]),
            ("n3", &["n1"]),
        ]));
        cluster
    }

    // =============================================================================
    // SCENARIO
    // =============================================================================

    #[test]
    fn test_value_reaches_every_node() {
        let cluster = star_cluster();

        cluster.client_broadcast("c1", "n2", 42);
        cluster.pump();

        for id in ["n1", "n2", "n3"] {
            assert_eq!(cluster.seen(id), BTreeSet::from([42]), "node {}", id);
        }
        assert!(cluster.failures().is_empty(), "{:?}", cluster.failures());
    }

    #[test]
    fn test_reads_return_the_value_everywhere() {
        let cluster = star_cluster();
        cluster.client_broadcast("c1", "n2", 42);
        cluster.pump();

        let requests: Vec<_> = ["n1", "n2", "n3"]
            .iter()
            .map(|id| cluster.client_read("c2", id))
            .collect();
        cluster.pump();

        for request in requests {
            assert_eq!(cluster.read_result("c2", request), Some(vec![42]));
        }
    }

    #[test]
    fn test_gossip_path_follows_topology() {
        let cluster = star_cluster();
        cluster.client_broadcast("c1", "n2", 42);
        cluster.pump();

        let log: Vec<(String, String)> = cluster
            .gossip_log()
            .into_iter()
            .map(|(src, dest, _)| (src.to_string(), dest.to_string()))
            .collect();

        // n2 → n1, then n1 → n3 only (n2 is the sender)
        assert_eq!(
            log,
            vec![
                ("n2".to_string(), "n1".to_string()),
                ("n1".to_string(), "n3".to_string()),
            ]
        );
    }

    #[test]
    fn test_client_gets_exactly_one_ack() {
        let cluster = star_cluster();
        let request = cluster.client_broadcast("c1", "n2", 42);
        cluster.pump();

        let replies = cluster.client_replies("c1");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].src, NodeId::from("n2"));
        assert_eq!(replies[0].body.in_reply_to, Some(request));
        assert_eq!(replies[0].body.payload, Payload::BroadcastOk);
    }

    #[test]
    fn test_topology_requests_are_acknowledged() {
        let cluster = star_cluster();

        let acks = cluster
            .client_replies("c0")
            .into_iter()
            .filter(|m| m.body.payload == Payload::TopologyOk)
            .count();
        assert_eq!(acks, 3);
        assert_eq!(
            *cluster.service("n1").neighbors(),
            vec![NodeId::from("n2"), NodeId::from("n3")]
        );
    }

    #[test]
    fn test_fresh_cluster_reads_empty() {
        let cluster = InMemoryCluster::new(3);
        let request = cluster.client_read("c1", "n3");
        cluster.pump();
        assert_eq!(cluster.read_result("c1", request), Some(vec![]));
    }
}
