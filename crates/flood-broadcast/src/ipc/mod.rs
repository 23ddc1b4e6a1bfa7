//! Inbound message decoding and handler registration.

mod handler;

pub use handler::register_handlers;
