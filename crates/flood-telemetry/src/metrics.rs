//! Prometheus metrics for flood gossip nodes.
//!
//! All metrics follow the naming convention: `flood_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., broadcasts_received_total)
//! - **Gauge**: Value that can go up or down (e.g., seen_values)
//! - **Histogram**: Distribution of values (e.g., handler_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts,
    HistogramVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISSEMINATION
    // =========================================================================

    /// Inbound broadcast messages, duplicates included
    pub static ref BROADCASTS_RECEIVED: Counter = Counter::new(
        "flood_broadcasts_received_total",
        "Total broadcast messages handled"
    ).expect("metric creation failed");

    /// Values stored for the first time
    pub static ref VALUES_FIRST_SEEN: Counter = Counter::new(
        "flood_values_first_seen_total",
        "Total distinct values added to the seen-store"
    ).expect("metric creation failed");

    /// Deliveries dropped by deduplication
    pub static ref DUPLICATES_SUPPRESSED: Counter = Counter::new(
        "flood_duplicates_suppressed_total",
        "Total broadcast deliveries of already-seen values"
    ).expect("metric creation failed");

    /// Forwards issued to neighbors
    pub static ref GOSSIP_SENDS: Counter = Counter::new(
        "flood_gossip_sends_total",
        "Total broadcast messages forwarded to neighbors"
    ).expect("metric creation failed");

    /// Current seen-store size
    pub static ref SEEN_VALUES: Gauge = Gauge::new(
        "flood_seen_values",
        "Number of distinct values in the seen-store"
    ).expect("metric creation failed");

    // =========================================================================
    // QUERIES AND TOPOLOGY
    // =========================================================================

    /// Read requests answered
    pub static ref READS_SERVED: Counter = Counter::new(
        "flood_reads_served_total",
        "Total read requests answered"
    ).expect("metric creation failed");

    /// Topology installs by neighbor source
    pub static ref TOPOLOGY_INSTALLS: CounterVec = CounterVec::new(
        Opts::new("flood_topology_installs_total", "Topology installs"),
        &["source"]  // source: assigned/fallback
    ).expect("metric creation failed");

    // =========================================================================
    // HANDLERS
    // =========================================================================

    /// Handler failures by error kind
    pub static ref HANDLER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("flood_handler_errors_total", "Handler failures by kind"),
        &["kind"]  // kind: malformed/send_failed/unsupported/...
    ).expect("metric creation failed");

    /// Handler latency by message type
    pub static ref HANDLER_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "flood_handler_duration_seconds",
            "Time spent inside a message handler"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("bucket layout")),
        &["type"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Encode all metrics as Prometheus text format.
    pub fn gather_text(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BROADCASTS_RECEIVED.clone()),
        Box::new(VALUES_FIRST_SEEN.clone()),
        Box::new(DUPLICATES_SUPPRESSED.clone()),
        Box::new(GOSSIP_SENDS.clone()),
        Box::new(SEEN_VALUES.clone()),
        Box::new(READS_SERVED.clone()),
        Box::new(TOPOLOGY_INSTALLS.clone()),
        Box::new(HANDLER_ERRORS.clone()),
        Box::new(HANDLER_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }

    /// Start a timer on the handler histogram for `message_type`.
    pub fn handler(message_type: &str) -> Self {
        Self::new(HANDLER_DURATION.with_label_values(&[message_type]))
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
