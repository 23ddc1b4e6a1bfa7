//! # Handler Wiring
//!
//! Connects the broadcast core to the runtime loop.
//!
//! ```text
//! stdin line ──→ RawEnvelope ──→ HandlerRegistry ──→ flood-broadcast handler
//!                                     │                       │
//!                                     │ unknown type          │ Transport port
//!                                     ▼                       ▼
//!                               error reply (10)        StdioTransport ──→ stdout
//! ```
//!
//! The core registers its handlers through the `HandlerRegistrar` port; the
//! runtime never names a handler directly.

pub mod registry;

pub use registry::HandlerRegistry;
