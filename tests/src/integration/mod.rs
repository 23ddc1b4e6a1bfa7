//! # Integration Tests
//!
//! Multi-node behavior of the flood broadcast core, driven through
//! [`InMemoryCluster`](crate::cluster::InMemoryCluster).
//!
//! - `e2e_flood` - the canonical three-node scenario and read/ack behavior
//! - `properties` - idempotence, no-echo, fallback, read completeness,
//!   random topologies and concurrent delivery

pub mod e2e_flood;
