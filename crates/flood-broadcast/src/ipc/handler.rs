//! Message handlers for the Flood Broadcast subsystem.
//!
//! Binds `broadcast`, `broadcast_ok`, `read` and `topology` to a
//! [`BroadcastApi`] through the transport's registration mechanism. Each
//! handler decodes the raw body into its typed payload first; a body that
//! does not decode is rejected as `MalformedInput` before the service is
//! touched, so a malformed `broadcast` is never acknowledged.

use shared_types::{Body, Envelope, GossipValue, MessageKind, Payload, RawEnvelope};
use std::sync::Arc;

use crate::domain::{HandlerOutcome, Origin};
use crate::events::BroadcastError;
use crate::ports::inbound::BroadcastApi;
use crate::ports::outbound::HandlerRegistrar;

/// Register this subsystem's handlers with the transport.
pub fn register_handlers<S, R>(service: Arc<S>, registrar: &mut R)
where
    S: BroadcastApi + 'static,
    R: HandlerRegistrar + ?Sized,
{
    let svc = Arc::clone(&service);
    registrar.register_handler(
        MessageKind::Broadcast,
        Box::new(move |raw: RawEnvelope| -> HandlerResult {
            let envelope = decode::<S::Value>(&raw)?;
            let origin = Origin::of(&envelope);
            match envelope.body.payload {
                Payload::Broadcast { message } => svc
                    .handle_broadcast(&origin, message)
                    .map(HandlerOutcome::Delivered),
                other => Err(unexpected(MessageKind::Broadcast, &other)),
            }
        }),
    );

    let svc = Arc::clone(&service);
    registrar.register_handler(
        MessageKind::BroadcastOk,
        Box::new(move |raw: RawEnvelope| -> HandlerResult {
            let envelope = decode::<S::Value>(&raw)?;
            svc.handle_broadcast_ok(&Origin::of(&envelope))?;
            Ok(HandlerOutcome::Acknowledged)
        }),
    );

    let svc = Arc::clone(&service);
    registrar.register_handler(
        MessageKind::Read,
        Box::new(move |raw: RawEnvelope| -> HandlerResult {
            let envelope = decode::<S::Value>(&raw)?;
            let values = svc.handle_read(&Origin::of(&envelope))?;
            Ok(HandlerOutcome::ReadServed { values })
        }),
    );

    let svc = service;
    registrar.register_handler(
        MessageKind::Topology,
        Box::new(move |raw: RawEnvelope| -> HandlerResult {
            let envelope = decode::<S::Value>(&raw)?;
            let origin = Origin::of(&envelope);
            match envelope.body.payload {
                Payload::Topology { topology } => {
                    let source = svc.handle_topology(&origin, &topology)?;
                    Ok(HandlerOutcome::TopologyInstalled {
                        source,
                        neighbors: svc.neighbors().len(),
                    })
                }
                other => Err(unexpected(MessageKind::Topology, &other)),
            }
        }),
    );
}

type HandlerResult = Result<HandlerOutcome, BroadcastError>;

fn decode<V: GossipValue>(raw: &RawEnvelope) -> Result<Envelope<Body<V>>, BroadcastError> {
    Ok(raw.decode::<V>()?)
}

fn unexpected<V>(expected: MessageKind, got: &Payload<V>) -> BroadcastError {
    BroadcastError::MalformedInput {
        kind: expected.to_string(),
        reason: format!("body decoded as {}", got.kind()),
    }
}
