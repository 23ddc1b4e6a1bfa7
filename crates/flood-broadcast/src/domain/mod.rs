//! # Domain Layer for Flood Broadcast
//!
//! Pure business logic with no I/O dependencies. This is the innermost layer
//! of the hexagonal architecture.
//!
//! ## Contents
//!
//! - **entities**: `Origin`, `ValueState`, `DeliveryOutcome`, `NeighborSource`
//! - **value_objects**: `BroadcastConfig`, `SeenStore`, `TopologyStore`, `BroadcastMetrics`
//! - **services**: `resolve_neighbors`, `gossip_targets`
//! - **invariants**: no-echo, self-exclusion and duplicate-free checks
//!
//! ## Design Principles
//!
//! 1. **No I/O**: All functions are pure and synchronous
//! 2. **No External Dependencies**: Only depends on shared-types
//! 3. **Testable**: All logic can be unit tested without mocks

mod entities;
mod invariants;
mod services;
mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
