//! # Adapter Implementations
//!
//! Concrete implementations of the broadcast core's outbound ports.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  flood-broadcast                          │
//! │    trait Transport<V>  (outbound port)    │
//! └─────────────────────┬─────────────────────┘
//!                       │ implements
//! ┌─────────────────────▼─────────────────────┐
//! │  StdioTransport (JSON lines on stdout)    │
//! └───────────────────────────────────────────┘
//! ```
//!
//! [`PrometheusBridge`] exports the core's counters to the metrics registry.

pub mod prometheus_bridge;
pub mod stdio_transport;

pub use prometheus_bridge::PrometheusBridge;
pub use stdio_transport::StdioTransport;
