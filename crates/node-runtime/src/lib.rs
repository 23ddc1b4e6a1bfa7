//! # Node Runtime Library
//!
//! Everything the `flood-node` binary is made of, exposed for tests.
//!
//! ## Structure
//!
//! - `adapters/` - outbound port implementations (stdio transport)
//! - `container/` - node configuration
//! - `wiring/` - handler registry between the loop and the broadcast core
//! - `runtime` - the line loop, init lifecycle and task dispatch

pub mod adapters;
pub mod container;
pub mod errors;
pub mod runtime;
pub mod wiring;

pub use adapters::StdioTransport;
pub use container::{ConfigError, NodeConfig, RuntimeConfig};
pub use errors::RuntimeError;
pub use runtime::{NodeRuntime, NodeService, RunSummary};
pub use wiring::HandlerRegistry;
