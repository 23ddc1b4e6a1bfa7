//! Hexagonal ports for the Flood Broadcast subsystem.

pub mod inbound;
pub mod outbound;
