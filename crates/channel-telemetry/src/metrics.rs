//! Prometheus metrics for message channels.
//!
//! All metrics follow the naming convention: `channel_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **CounterVec**: Per-destination message and failure counts
//! - **Histogram**: Send call duration

use lazy_static::lazy_static;
use prometheus::{exponential_buckets, CounterVec, Encoder, Histogram, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Messages accepted for delivery
    pub static ref CHANNEL_MESSAGES_SENT: CounterVec = CounterVec::new(
        Opts::new("channel_messages_sent_total", "Messages accepted for delivery"),
        &["destination"]
    ).expect("metric creation failed");

    /// Failed send attempts by failure kind
    pub static ref CHANNEL_SEND_FAILURES: CounterVec = CounterVec::new(
        Opts::new("channel_send_failures_total", "Send attempts that returned a failure"),
        &["destination", "kind"]  // kind: registration/delivery
    ).expect("metric creation failed");

    /// Messages handed to a destination's receiver
    pub static ref CHANNEL_MESSAGES_DELIVERED: CounterVec = CounterVec::new(
        Opts::new("channel_messages_delivered_total", "Messages handed to receivers"),
        &["destination"]
    ).expect("metric creation failed");

    /// Time spent inside a send call
    pub static ref CHANNEL_SEND_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "channel_send_duration_seconds",
            "Time spent in send calls, retries included"
        ).buckets(exponential_buckets(0.000_001, 4.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CHANNEL_MESSAGES_SENT.clone()),
        Box::new(CHANNEL_SEND_FAILURES.clone()),
        Box::new(CHANNEL_MESSAGES_DELIVERED.clone()),
        Box::new(CHANNEL_SEND_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Record the outcome of one send. `failure_kind` is `None` on success.
pub fn record_send(destination: &str, failure_kind: Option<&str>) {
    match failure_kind {
        None => CHANNEL_MESSAGES_SENT.with_label_values(&[destination]).inc(),
        Some(kind) => CHANNEL_SEND_FAILURES
            .with_label_values(&[destination, kind])
            .inc(),
    }
}

/// Record messages handed to a destination's receiver.
pub fn record_delivered(destination: &str, count: u64) {
    CHANNEL_MESSAGES_DELIVERED
        .with_label_values(&[destination])
        .inc_by(count as f64);
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
