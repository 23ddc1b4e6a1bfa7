//! # Handler Registry
//!
//! Maps each inbound message type to the handler the broadcast core
//! registered for it.

use std::collections::HashMap;

use flood_broadcast::{BroadcastError, Handler, HandlerOutcome, HandlerRegistrar};
use shared_types::{MessageKind, RawEnvelope};
use tracing::debug;

/// Message type → handler table.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageKind, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered message types, sorted by wire name.
    pub fn kinds(&self) -> Vec<MessageKind> {
        let mut kinds: Vec<MessageKind> = self.handlers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Route `raw` to its handler.
    ///
    /// # Errors
    /// `Unsupported` when the body's type has no handler; otherwise whatever
    /// the handler returns.
    pub fn dispatch(&self, raw: RawEnvelope) -> Result<HandlerOutcome, BroadcastError> {
        let kind_str = raw.kind_str()?;
        let handler = MessageKind::parse(kind_str)
            .and_then(|kind| self.handlers.get(&kind))
            .ok_or_else(|| BroadcastError::Unsupported(kind_str.to_string()))?;
        handler(raw)
    }
}

impl HandlerRegistrar for HandlerRegistry {
    fn register_handler(&mut self, kind: MessageKind, handler: Handler) {
        debug!("[runtime] Registered handler for {}", kind);
        self.handlers.insert(kind, handler);
    }
}
