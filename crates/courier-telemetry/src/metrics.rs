//! Prometheus metrics for correlated calls.
//!
//! All metrics follow the naming convention: `courier_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{exponential_buckets, Counter, Encoder, Gauge, Histogram, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CORRELATOR METRICS
    // =========================================================================

    /// Calls registered and handed to the transport
    pub static ref CALLS_ISSUED: Counter = Counter::new(
        "courier_correlator_calls_issued_total",
        "Total number of calls registered by the correlator"
    ).expect("metric creation failed");

    /// Calls resolved by a matching response
    pub static ref CALLS_COMPLETED: Counter = Counter::new(
        "courier_correlator_calls_completed_total",
        "Total number of calls resolved by a matching response"
    ).expect("metric creation failed");

    /// Calls resolved by the deadline
    pub static ref CALLS_TIMED_OUT: Counter = Counter::new(
        "courier_correlator_calls_timed_out_total",
        "Total number of calls resolved with a timeout payload"
    ).expect("metric creation failed");

    /// Calls resolved by explicit cancellation
    pub static ref CALLS_CANCELLED: Counter = Counter::new(
        "courier_correlator_calls_cancelled_total",
        "Total number of calls resolved with a cancellation payload"
    ).expect("metric creation failed");

    /// Calls currently awaiting resolution
    pub static ref CALLS_IN_FLIGHT: Gauge = Gauge::new(
        "courier_correlator_calls_in_flight",
        "Number of calls awaiting resolution"
    ).expect("metric creation failed");

    /// End-to-end call duration
    pub static ref CALL_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "courier_correlator_call_duration_seconds",
            "Time from registration to consumption of the terminal payload"
        ).buckets(exponential_buckets(0.001, 2.0, 16).unwrap_or_default())
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSPORT METRICS
    // =========================================================================

    /// Inbound messages that matched no pending call
    pub static ref UNMATCHED_RESPONSES: Counter = Counter::new(
        "courier_sink_unmatched_responses_total",
        "Inbound messages dropped because no call was waiting for them"
    ).expect("metric creation failed");

    /// Failed publish attempts
    pub static ref PUBLISH_FAILURES: Counter = Counter::new(
        "courier_transport_publish_failures_total",
        "Outbound envelopes the transport refused to publish"
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics were registered with.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Correlator
        Box::new(CALLS_ISSUED.clone()),
        Box::new(CALLS_COMPLETED.clone()),
        Box::new(CALLS_TIMED_OUT.clone()),
        Box::new(CALLS_CANCELLED.clone()),
        Box::new(CALLS_IN_FLIGHT.clone()),
        Box::new(CALL_DURATION.clone()),
        // Transport
        Box::new(UNMATCHED_RESPONSES.clone()),
        Box::new(PUBLISH_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_correlator_metrics() {
        register_metrics().unwrap();
        CALLS_ISSUED.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("courier_correlator_calls_issued_total"));
        assert!(text.contains("courier_sink_unmatched_responses_total"));
    }
}
