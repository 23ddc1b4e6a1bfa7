//! # Flood Broadcast Subsystem
//!
//! Disseminates application values across the cluster by flooding: every
//! value a node sees for the first time is forwarded to each configured
//! neighbor except the one it came from.
//!
//! ## Architecture Role
//!
//! ```text
//! [Client / Peer] ──broadcast──→ [BroadcastService]
//!        ↑                            │  1. reply broadcast_ok
//!        └──────broadcast_ok──────────┤  2. SeenStore::observe (test-and-set)
//!                                     ↓  3. first sight only: propagate
//!                          ┌──────────┴──────────┐
//!                          ↓                     ↓
//!                    [Neighbor A]          [Neighbor B] ...   (sender excluded)
//! ```
//!
//! ## Guarantees
//!
//! - Every `broadcast` is acknowledged exactly once, new or duplicate
//! - At most one propagation burst per distinct value per node
//! - A burst never targets the node the value arrived from
//! - Topology installs are atomic swaps; readers never see a partial list

pub mod domain;
pub mod events;
pub mod ipc;
pub mod ports;
pub mod service;

pub use domain::*;
pub use events::BroadcastError;
pub use ipc::register_handlers;
pub use ports::inbound::BroadcastApi;
pub use ports::outbound::{Handler, HandlerRegistrar, Transport};
pub use service::BroadcastService;
