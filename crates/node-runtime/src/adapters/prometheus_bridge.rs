//! # Prometheus Bridge
//!
//! Mirrors the broadcast core's own counters into Prometheus.
//!
//! The core updates [`BroadcastMetrics`] on every path, including handlers
//! that insert a value and then fail to forward it. Publishing the growth of
//! those counters, rather than inferring it from handler results, keeps the
//! exported series equal to the core's state.

use flood_broadcast::{BroadcastApi, BroadcastMetrics};
use flood_telemetry::{
    BROADCASTS_RECEIVED, DUPLICATES_SUPPRESSED, GOSSIP_SENDS, READS_SERVED, SEEN_VALUES,
    VALUES_FIRST_SEEN,
};
use parking_lot::Mutex;
use prometheus::{Counter, Gauge};

/// Publishes core counter deltas and the seen-store size.
pub struct PrometheusBridge {
    broadcasts_received: Counter,
    values_first_seen: Counter,
    duplicates_suppressed: Counter,
    gossip_sends: Counter,
    reads_served: Counter,
    seen_values: Gauge,
    published: Mutex<BroadcastMetrics>,
}

impl PrometheusBridge {
    /// Bridge onto the process-wide registry.
    pub fn global() -> Self {
        Self {
            broadcasts_received: BROADCASTS_RECEIVED.clone(),
            values_first_seen: VALUES_FIRST_SEEN.clone(),
            duplicates_suppressed: DUPLICATES_SUPPRESSED.clone(),
            gossip_sends: GOSSIP_SENDS.clone(),
            reads_served: READS_SERVED.clone(),
            seen_values: SEEN_VALUES.clone(),
            published: Mutex::new(BroadcastMetrics::default()),
        }
    }

    /// Push whatever the core counted since the last call.
    pub fn publish<S: BroadcastApi + ?Sized>(&self, service: &S) {
        let mut published = self.published.lock();
        let current = service.get_metrics();

        self.broadcasts_received
            .inc_by(growth(current.broadcasts_received, published.broadcasts_received));
        self.values_first_seen
            .inc_by(growth(current.values_first_seen, published.values_first_seen));
        self.duplicates_suppressed
            .inc_by(growth(current.duplicates_suppressed, published.duplicates_suppressed));
        self.gossip_sends
            .inc_by(growth(current.gossip_sends, published.gossip_sends));
        self.reads_served
            .inc_by(growth(current.reads_served, published.reads_served));
        self.seen_values.set(service.seen_count() as f64);

        *published = current;
    }

    #[cfg(test)]
    pub(crate) fn seen_values(&self) -> f64 {
        self.seen_values.get()
    }

    #[cfg(test)]
    pub(crate) fn values_first_seen(&self) -> f64 {
        self.values_first_seen.get()
    }

    /// Bridge onto unregistered metrics, private to one test.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        let counter = |name: &str| Counter::new(name, "test").unwrap();
        Self {
            broadcasts_received: counter("broadcasts_received"),
            values_first_seen: counter("values_first_seen"),
            duplicates_suppressed: counter("duplicates_suppressed"),
            gossip_sends: counter("gossip_sends"),
            reads_served: counter("reads_served"),
            seen_values: Gauge::new("seen_values", "test").unwrap(),
            published: Mutex::new(BroadcastMetrics::default()),
        }
    }
}

fn growth(now: u64, before: u64) -> f64 {
    now.saturating_sub(before) as f64
}
