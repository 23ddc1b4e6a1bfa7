//! # Node Runtime Loop
//!
//! Reads one envelope per line, performs the `init` handshake, and hands
//! every other message to the broadcast core on its own task.
//!
//! ## Lifecycle
//!
//! 1. Until `init` arrives, requests get error 11 (temporarily unavailable).
//! 2. `init` fixes identity and membership and is answered with `init_ok`.
//!    A second `init` gets error 22 (precondition failed).
//! 3. Each later message runs on a blocking-pool task, at most
//!    `max_in_flight` at once.
//! 4. End of input waits for every in-flight task, then returns.
//!
//! Replies the loop writes itself (`init_ok`, early errors) also go through
//! the blocking pool, but are awaited before the next line is read.

use std::sync::Arc;

use flood_broadcast::{
    register_handlers, BroadcastApi, BroadcastError, BroadcastService, HandlerOutcome, Origin,
};
use flood_telemetry::{HistogramTimer, HANDLER_ERRORS, TOPOLOGY_INSTALLS};
use shared_types::{Datum, ErrorCode, MessageKind, Payload, RawEnvelope};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::adapters::{PrometheusBridge, StdioTransport};
use crate::container::{NodeConfig, RuntimeConfig};
use crate::errors::RuntimeError;
use crate::wiring::HandlerRegistry;

/// The broadcast core as deployed: arbitrary JSON values over stdio.
pub type NodeService = BroadcastService<Datum, StdioTransport>;

/// Line counts for one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-empty input lines.
    pub lines: u64,
    /// Messages handed to a handler task.
    pub dispatched: u64,
    /// Lines answered or consumed by the loop itself (init, errors, early
    /// requests).
    pub control: u64,
    /// Lines that were not a valid envelope.
    pub dropped: u64,
}

/// What the loop decided to do with one line.
enum Intake {
    Dispatch(RawEnvelope),
    Control,
    Dropped,
}

/// One flood gossip node.
pub struct NodeRuntime {
    config: RuntimeConfig,
    transport: Arc<StdioTransport>,
    service: Arc<NodeService>,
    registry: Arc<HandlerRegistry>,
    metrics: Arc<PrometheusBridge>,
    in_flight: Arc<Semaphore>,
}

impl NodeRuntime {
    /// Build the service and register its handlers.
    pub fn new(config: &NodeConfig, transport: Arc<StdioTransport>) -> Result<Self, RuntimeError> {
        Self::with_metrics(config, transport, PrometheusBridge::global())
    }

    fn with_metrics(
        config: &NodeConfig,
        transport: Arc<StdioTransport>,
        metrics: PrometheusBridge,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let service = Arc::new(BroadcastService::new(
            config.broadcast.clone(),
            Arc::clone(&transport),
        ));

        let mut registry = HandlerRegistry::new();
        register_handlers(Arc::clone(&service), &mut registry);
        debug!("[runtime] Handlers registered: {:?}", registry.kinds());

        Ok(Self {
            config: config.runtime.clone(),
            transport,
            service,
            registry: Arc::new(registry),
            metrics: Arc::new(metrics),
            in_flight: Arc::new(Semaphore::new(config.runtime.max_in_flight as usize)),
        })
    }

    pub fn service(&self) -> Arc<NodeService> {
        Arc::clone(&self.service)
    }

    /// Run until `reader` reaches end of input.
    pub async fn run<R>(&self, reader: R) -> Result<RunSummary, RuntimeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut summary = RunSummary::default();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            summary.lines += 1;

            match self.intake(line).await {
                Intake::Dispatch(raw) => {
                    self.spawn_handler(raw).await?;
                    summary.dispatched += 1;
                }
                Intake::Control => summary.control += 1,
                Intake::Dropped => summary.dropped += 1,
            }
        }

        self.drain().await?;

        let metrics = self.service.get_metrics();
        info!(
            lines = summary.lines,
            dispatched = summary.dispatched,
            seen = metrics.values_first_seen,
            duplicates = metrics.duplicates_suppressed,
            gossip_sends = metrics.gossip_sends,
            "[runtime] Input closed, all handlers finished"
        );
        Ok(summary)
    }

    /// Classify a line; handle control messages in place.
    async fn intake(&self, line: &str) -> Intake {
        let raw = match RawEnvelope::parse(line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[runtime] Dropping unparsable line: {}", e);
                HANDLER_ERRORS.with_label_values(&["invalid_envelope"]).inc();
                return Intake::Dropped;
            }
        };

        match raw.kind_str() {
            Ok("init") => {
                self.handle_init(&raw).await;
                Intake::Control
            }
            Ok("error") => {
                warn!(
                    code = ?raw.body.get("code"),
                    text = ?raw.body.get("text"),
                    "[runtime] Error reply from {}",
                    raw.src
                );
                Intake::Control
            }
            _ if !self.transport.is_initialized() => {
                self.send_error(
                    &raw,
                    ErrorCode::TEMPORARILY_UNAVAILABLE,
                    "node has not received init",
                )
                .await;
                Intake::Control
            }
            _ => Intake::Dispatch(raw),
        }
    }

    async fn handle_init(&self, raw: &RawEnvelope) {
        let envelope = match raw.decode::<Datum>() {
            Ok(envelope) => envelope,
            Err(e) => {
                self.send_error(raw, ErrorCode::MALFORMED_REQUEST, e.to_string()).await;
                return;
            }
        };
        let Payload::Init { node_id, node_ids } = envelope.body.payload else {
            self.send_error(raw, ErrorCode::MALFORMED_REQUEST, "init body expected").await;
            return;
        };

        let peers = node_ids.len();
        match self.transport.init(node_id.clone(), node_ids) {
            Ok(()) => {
                info!("[runtime] Initialized as {} ({} nodes in cluster)", node_id, peers);
                let origin = Origin::new(raw.src.clone(), raw.msg_id());
                self.write_control("init_ok", move |transport| transport.reply_init_ok(&origin))
                    .await;
            }
            Err(e) => {
                warn!("[runtime] Rejecting init: {}", e);
                self.send_error(raw, ErrorCode::PRECONDITION_FAILED, e.to_string()).await;
            }
        }
    }

    async fn send_error(&self, raw: &RawEnvelope, code: ErrorCode, text: impl Into<String>) {
        let origin = Origin::new(raw.src.clone(), raw.msg_id());
        let local = raw.dest.clone();
        let text = text.into();
        self.write_control("error", move |transport| {
            transport.reply_error(&local, &origin, code, text)
        })
        .await;
    }

    /// Write a loop-level reply on the blocking pool and wait for it.
    async fn write_control<F>(&self, what: &'static str, write: F)
    where
        F: FnOnce(&StdioTransport) -> Result<(), BroadcastError> + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        match tokio::task::spawn_blocking(move || write(transport.as_ref())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("[runtime] Failed to send {}: {}", what, e),
            Err(e) => error!("[runtime] {} writer task failed: {}", what, e),
        }
    }

    async fn spawn_handler(&self, raw: RawEnvelope) -> Result<(), RuntimeError> {
        let permit = Arc::clone(&self.in_flight)
            .acquire_owned()
            .await
            .map_err(|_| RuntimeError::LimiterClosed)?;
        let registry = Arc::clone(&self.registry);
        let transport = Arc::clone(&self.transport);
        let service = Arc::clone(&self.service);
        let metrics = Arc::clone(&self.metrics);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            handle_message(&registry, &transport, raw);
            metrics.publish(&*service);
        });
        Ok(())
    }

    /// Wait until every in-flight handler has released its permit.
    async fn drain(&self) -> Result<(), RuntimeError> {
        let _all = self
            .in_flight
            .acquire_many(self.config.max_in_flight)
            .await
            .map_err(|_| RuntimeError::LimiterClosed)?;
        Ok(())
    }
}

/// Run one handler and account for the result.
fn handle_message(registry: &HandlerRegistry, transport: &StdioTransport, raw: RawEnvelope) {
    let kind = raw.kind_str().ok().and_then(MessageKind::parse);
    let label = kind.map_or("unknown", |k| k.as_str());
    let origin = Origin::new(raw.src.clone(), raw.msg_id());
    let local = raw.dest.clone();

    let _timer = HistogramTimer::handler(label);
    match registry.dispatch(raw) {
        Ok(outcome) => record_outcome(outcome),
        Err(err) => {
            HANDLER_ERRORS.with_label_values(&[error_label(&err)]).inc();
            match &err {
                BroadcastError::MalformedInput { .. } if kind == Some(MessageKind::Broadcast) => {
                    // Not acknowledged: the sender will retry
                    warn!("[runtime] Ignoring broadcast from {}: {}", origin.src, err);
                }
                BroadcastError::SendFailed { .. } => {
                    error!("[runtime] {} handler from {} failed: {}", label, origin.src, err);
                }
                BroadcastError::MalformedInput { .. } | BroadcastError::Unsupported(_) => {
                    warn!("[runtime] Rejecting {} from {}: {}", label, origin.src, err);
                    if let Err(e) = transport.reply_error(&local, &origin, err.code(), err.to_string())
                    {
                        error!("[runtime] Failed to send error reply to {}: {}", origin.src, e);
                    }
                }
            }
        }
    }
}

/// Labelled series the core does not count itself. The rest are published
/// by [`PrometheusBridge`].
fn record_outcome(outcome: HandlerOutcome) {
    if let HandlerOutcome::TopologyInstalled { source, .. } = outcome {
        TOPOLOGY_INSTALLS.with_label_values(&[source.as_str()]).inc();
    }
}

fn error_label(err: &BroadcastError) -> &'static str {
    match err {
        BroadcastError::MalformedInput { .. } => "malformed",
        BroadcastError::SendFailed { .. } => "send_failed",
        BroadcastError::Unsupported(_) => "unsupported",
    }
}
