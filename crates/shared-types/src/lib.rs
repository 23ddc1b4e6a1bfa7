//! # Shared Types Crate
//!
//! This crate contains the wire entities exchanged between nodes and clients:
//! node identifiers, the opaque broadcast value, and the `Envelope<B>` /
//! `Body<V>` / `Payload<V>` message shapes.
//!
//! ## Design Principles
//!
//! - **Closed message set**: every message kind is a variant of [`Payload`],
//!   tagged on the JSON `type` field.
//! - **Envelope Authority**: `src` and `dest` live on the envelope only;
//!   payloads never repeat the sender's identity.
//! - **Two-stage decoding**: lines are first parsed into a [`RawEnvelope`] so
//!   the `type` can be routed before the body is decoded into a typed payload.
//!   A body that fails the second stage is malformed, not unsupported.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::{Body, Envelope, MessageKind, NeighborEntry, Payload, RawEnvelope};
pub use errors::*;
